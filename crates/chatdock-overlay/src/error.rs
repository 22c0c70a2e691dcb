use std::io;

use thiserror::Error;

use crate::ContentId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to create window {0}")]
    WindowCreation(String),
    #[error("Window {0} not found")]
    WindowNotFound(String),
    #[error("No window owns content {0}")]
    ParentNotFound(ContentId),
    #[error("Failed to load overlay document: {0}")]
    Navigation(String),
    #[error("Failed to relay message on {channel}: {reason}")]
    Relay { channel: String, reason: String },
    #[error("Window host error: {0}")]
    Host(String),
    #[error("Invalid overlay config: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
