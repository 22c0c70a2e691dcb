use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ContentId, Error, WindowChrome, WindowId};

/// Window geometry in logical units
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    /// Size of a default overlay: these bounds shrunk by `margin` on each axis
    pub fn shrunk_by(&self, margin: u32) -> (u32, u32) {
        (
            self.width.saturating_sub(margin),
            self.height.saturating_sub(margin),
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

/// Background of overlays in the light theme (`#3498db`)
pub const LIGHT_BACKGROUND: Rgba = Rgba(0x34, 0x98, 0xdb, 0xff);
/// Background of overlays in the dark theme (`#1E1E1E`)
pub const DARK_BACKGROUND: Rgba = Rgba(0x1e, 0x1e, 0x1e, 0xff);

pub fn background_for(dark_mode: bool) -> Rgba {
    if dark_mode {
        DARK_BACKGROUND
    } else {
        LIGHT_BACKGROUND
    }
}

/// What the overlay's content process is allowed to do.
///
/// Overlays run with native API access and embedded views enabled and
/// without context isolation; service popups depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentPermissions {
    pub native_api_access: bool,
    pub embedded_views: bool,
    pub context_isolation: bool,
}

impl ContentPermissions {
    pub const OVERLAY: ContentPermissions = ContentPermissions {
        native_api_access: true,
        embedded_views: true,
        context_isolation: false,
    };
}

/// Everything a host needs to build an overlay window
#[derive(Debug, Clone)]
pub struct WindowSpec<W> {
    pub width: u32,
    pub height: u32,
    pub chrome: WindowChrome,
    pub transparent: bool,
    pub modal: bool,
    pub parent: Option<W>,
    pub background: Rgba,
    pub permissions: ContentPermissions,
}

/// Local document to load into an overlay, addressed by fragment and query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTarget {
    pub document: String,
    pub fragment: String,
    pub query: IndexMap<String, String>,
}

impl LoadTarget {
    /// Query string without the leading `?`, or `None` when empty
    pub fn query_string(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }

        let pairs: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();

        Some(pairs.join("&"))
    }

    /// `document?query#fragment`, the form a loaded overlay's URL ends with
    pub fn to_url_suffix(&self) -> String {
        let mut url = self.document.clone();
        if let Some(query) = self.query_string() {
            url.push('?');
            url.push_str(&query);
        }
        url.push('#');
        url.push_str(&self.fragment);
        url
    }
}

pub type WindowCallback = Box<dyn FnOnce() + Send + 'static>;

/// A top-level window as seen by the overlay manager.
///
/// Handles are cheap to clone and refer to the same native window.
pub trait OverlayWindow: Clone + Send + Sync + 'static {
    fn id(&self) -> WindowId;

    /// Id of the content process rendering this window
    fn content_id(&self) -> ContentId;

    /// Current resolved address of the loaded document
    fn url(&self) -> Result<String, Error>;

    fn bounds(&self) -> Result<Bounds, Error>;

    fn show(&self) -> Result<(), Error>;

    fn focus(&self) -> Result<(), Error>;

    /// Give keyboard focus to the window's content
    fn focus_content(&self) -> Result<(), Error>;

    fn open_devtools(&self);

    fn close(&self) -> Result<(), Error>;

    fn load(&self, target: &LoadTarget) -> Result<(), Error>;

    /// Deliver `payload` to the window's content on `channel`
    fn send(&self, channel: &str, payload: &[Value]) -> Result<(), Error>;

    /// Run `callback` once, the first time the window is ready to be shown
    fn once_ready_to_show(&self, callback: WindowCallback);

    /// Run `callback` once when the window closes
    fn on_closed(&self, callback: WindowCallback);
}

/// The windowing toolkit the overlay manager drives
pub trait WindowHost: Send + Sync + 'static {
    type Window: OverlayWindow;

    /// All open top-level windows
    fn windows(&self) -> Vec<Self::Window>;

    /// Window whose content process has the given id
    fn window_for_content(&self, content: ContentId) -> Option<Self::Window>;

    fn create_window(&self, spec: &WindowSpec<Self::Window>) -> Result<Self::Window, Error>;

    /// Let the window's content call back into application objects.
    /// Must happen before the first navigation.
    fn enable_remote(&self, window: &Self::Window) -> Result<(), Error>;
}
