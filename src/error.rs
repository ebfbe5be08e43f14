//! Error types for the blob tracker.

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur while configuring or running the tracker.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("empty frame: {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no tracked object with id {0}")]
    UnknownObject(u64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
