//! Platform-dependent overlay chrome
//!
//! Title bar and frame styling differ between platform families. Rather than
//! branching on the target at every call site, the choice is expressed as a
//! [`ChromePolicy`] listing which platforms get which treatment, so a new
//! platform only needs an entry in the policy.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Macos,
    Windows,
    Linux,
    Other,
}

impl Platform {
    /// Platform family this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Macos
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TitleBarStyle {
    Default,
    Hidden,
}

/// Resolved chrome for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowChrome {
    pub title_bar: TitleBarStyle,
    pub frameless: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChromePolicy {
    /// Platforms whose overlays hide the native title bar
    #[serde(default = "default_hidden_title_bar")]
    pub hidden_title_bar: Vec<Platform>,
    /// Platforms whose overlays keep the native frame; all others are frameless
    #[serde(default = "default_framed")]
    pub framed: Vec<Platform>,
}

fn default_hidden_title_bar() -> Vec<Platform> {
    vec![Platform::Macos]
}

fn default_framed() -> Vec<Platform> {
    vec![Platform::Linux]
}

impl Default for ChromePolicy {
    fn default() -> Self {
        Self {
            hidden_title_bar: default_hidden_title_bar(),
            framed: default_framed(),
        }
    }
}

impl ChromePolicy {
    pub fn chrome_for(&self, platform: Platform) -> WindowChrome {
        let title_bar = if self.hidden_title_bar.contains(&platform) {
            TitleBarStyle::Hidden
        } else {
            TitleBarStyle::Default
        };

        WindowChrome {
            title_bar,
            frameless: !self.framed.contains(&platform),
        }
    }
}
