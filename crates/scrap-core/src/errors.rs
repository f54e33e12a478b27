//! Cross-cutting error types for the scrapbook store.
//!
//! Domain-specific errors (`DatabaseError`, `BlobError`, `LifecycleError`) are
//! defined in their respective crates. This module holds the errors raised by
//! the shared types themselves: parsing, key validation, and randomness.

use thiserror::Error;

/// Errors that can be raised by any scrapbook crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A caller-supplied asset path escapes the asset key namespace.
    #[error("Invalid asset path '{path}': {reason}")]
    InvalidAssetPath { path: String, reason: String },

    /// The operating system random source failed.
    #[error("Random source unavailable: {0}")]
    Randomness(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
