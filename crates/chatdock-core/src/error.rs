use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Main window {0} not found")]
    MainWindowMissing(String),
}

/// Wrap a toolkit error for the overlay manager
pub(crate) fn host_error(e: tauri::Error) -> chatdock_overlay::Error {
    chatdock_overlay::Error::Host(e.to_string())
}
