pub mod lifecycle;
pub mod manager;
pub mod platform;
pub mod window;

pub use lifecycle::*;
pub use manager::OverlayManager;
pub use platform::*;
pub use window::*;
