use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ChromePolicy, Error};

/// Environment variable that forces devtools on (`1`/`true`) or off.
pub const DEV_MODE_ENV: &str = "CHATDOCK_DEV_MODE";

/// How relay subscriptions behave across repeated overlay opens.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelayPolicy {
    /// One relay per open overlay, detached when it closes
    #[default]
    Deduplicated,
    /// Relays are never detached; each one ever attached delivers on its own,
    /// so messages are duplicated once per overlay opened so far
    Accumulating,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayConfig {
    #[serde(default = "default_document")]
    pub document: String,
    #[serde(default = "default_size_margin")]
    pub size_margin: u32,
    #[serde(default = "default_dev_mode")]
    pub dev_mode: bool,
    #[serde(default)]
    pub chrome: ChromePolicy,
    #[serde(default)]
    pub relay_policy: RelayPolicy,
}

fn default_document() -> String {
    "overlay.html".to_string()
}

fn default_size_margin() -> u32 {
    100
}

fn default_dev_mode() -> bool {
    cfg!(debug_assertions)
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            document: default_document(),
            size_margin: default_size_margin(),
            dev_mode: default_dev_mode(),
            chrome: ChromePolicy::default(),
            relay_policy: RelayPolicy::default(),
        }
    }
}

impl OverlayConfig {
    /// Load the config from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.document.trim().is_empty() {
            return Err(Error::Config("document must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(DEV_MODE_ENV).ok();
        self.with_dev_mode_override(value.as_deref())
    }

    fn with_dev_mode_override(mut self, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.dev_mode = matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true");
        }
        self
    }
}
