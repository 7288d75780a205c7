//! Error types for object store access

use thiserror::Error;

/// Object store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key failed validation (empty, path separators, traversal)
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Sidecar metadata could not be read or written
    #[error("Metadata error for {key}: {message}")]
    Metadata { key: String, message: String },

    /// IO error from the backing filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
