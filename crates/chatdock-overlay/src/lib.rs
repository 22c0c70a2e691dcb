//! Overlay windows for a chat aggregator: open-or-reuse by route, lifecycle
//! tracking, and message relay between the main window and its overlays.
//!
//! The windowing toolkit is reached only through [`WindowHost`] and
//! [`OverlayWindow`]; `chatdock-core` provides the Tauri implementation.

pub mod config;
pub mod error;
pub mod ids;
pub mod overlay;
pub mod registry;
pub mod relay;
pub mod request;
pub mod settings;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use overlay::*;
pub use registry::*;
pub use relay::*;
pub use request::*;
pub use settings::*;
