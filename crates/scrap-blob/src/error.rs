//! Blob store error types.

use std::time::Duration;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// No blob is stored under the key.
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// The store is not configured or cannot be reached.
    #[error("Object store unavailable: {0}")]
    Unavailable(String),

    /// The call did not finish within the configured bound.
    #[error("Object store call '{operation}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The key cannot be used as an object path.
    #[error("Invalid blob key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Any other failure reported by the backend.
    #[error("Object store error: {0}")]
    ObjectStore(#[source] object_store::Error),
}

impl BlobError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<object_store::Error> for BlobError {
    fn from(e: object_store::Error) -> Self {
        match e {
            object_store::Error::NotFound { path, .. } => Self::NotFound(path),
            object_store::Error::InvalidPath { source } => Self::InvalidKey {
                key: String::new(),
                reason: source.to_string(),
            },
            other => Self::ObjectStore(other),
        }
    }
}
