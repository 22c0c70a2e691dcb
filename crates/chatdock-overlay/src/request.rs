use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ContentId;

/// Placeholder in a route that is replaced by the requesting webview's id.
pub const CONTENT_ID_PLACEHOLDER: &str = "{webContentsId}";

/// A request to open (or bring forward) an overlay window.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenOverlayRequest {
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub modal: bool,
    #[serde(
        default,
        alias = "overrideParentId",
        skip_serializing_if = "Option::is_none"
    )]
    pub override_parent: Option<ContentId>,
}

impl OpenOverlayRequest {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            ..Self::default()
        }
    }

    /// Route with the first `{webContentsId}` replaced by the sender id.
    ///
    /// Without a sender the route is returned untouched, placeholder included.
    pub fn resolve_route(&self, sender: Option<ContentId>) -> String {
        match sender {
            Some(id) => self
                .route
                .replacen(CONTENT_ID_PLACEHOLDER, &id.to_string(), 1),
            None => self.route.clone(),
        }
    }
}

/// Result of an open request. Produced exactly once per request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverlayOutcome {
    /// An already open window was brought to the front.
    #[serde(alias = "show")]
    Shown,
    /// A new window was created and has since been closed.
    Closed,
    /// Setup failed; the failure was logged.
    Error,
}

impl OverlayOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayOutcome::Shown => "shown",
            OverlayOutcome::Closed => "closed",
            OverlayOutcome::Error => "error",
        }
    }
}
