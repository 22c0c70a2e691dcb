pub mod host;
pub mod platform;
pub mod window;

pub use host::TauriHost;
pub use platform::apply_chrome;
pub use window::TauriWindow;
pub(crate) use window::ReadySignal;
