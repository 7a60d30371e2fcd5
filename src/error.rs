//! Error types for the path store.

use thiserror::Error;

/// Errors raised by store, node and metadata operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A mutating call targeted a path gated by the protection policy.
    #[error("Path '{0}' is protected and cannot be modified")]
    Protected(String),

    /// A strict read found nothing, or found a value of the wrong shape.
    #[error("Missing or invalid value at '{path}': {reason}")]
    MissingOrInvalid { path: String, reason: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    pub(crate) fn missing(path: impl ToString, reason: impl Into<String>) -> Self {
        StoreError::MissingOrInvalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for StoreError {
    fn from(err: config::ConfigError) -> Self {
        StoreError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
