//! Lifecycle error types.
//!
//! Every manager operation returns a [`LifecycleError`] on failure. Each
//! variant has a stable [`ErrorKind`] and an HTTP status hint so the caller-facing
//! layer can render it without inspecting messages.

use chrono::{DateTime, Utc};
use scrap_core::enums::ErrorKind;
use scrap_core::errors::CoreError;
use scrap_db::error::DatabaseError;
use thiserror::Error;

/// Caller input that was rejected before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Only PNG files are allowed (got '{filename}')")]
    UnsupportedMediaType {
        filename: String,
        declared_type: Option<String>,
    },

    #[error("File is {size} bytes; the limit is {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Invalid frame size '{0}': expected 20x20 or 20x30")]
    InvalidFrameSize(String),

    #[error("Layer index must be at least 1 (got {0})")]
    InvalidLayer(i64),

    #[error("Invalid asset path: {0}")]
    InvalidAssetPath(String),

    #[error("Asset {asset_id} belongs to project {asset_project_id}, not project {project_id}")]
    AssetProjectMismatch {
        asset_id: i64,
        asset_project_id: i64,
        project_id: i64,
    },
}

impl ValidationError {
    /// HTTP status hint: 415 for media type, 413 for size, 400 otherwise.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::UnsupportedMediaType { .. } => 415,
            Self::PayloadTooLarge { .. } => 413,
            _ => 400,
        }
    }
}

/// Errors from lifecycle manager operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Shared link '{token}' expired at {expired_at}")]
    Expired {
        token: String,
        expired_at: DateTime<Utc>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Object storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Metadata store error: {0}")]
    Store(#[source] DatabaseError),

    /// A cross-store operation failed and its compensation failed too. The
    /// named blob is orphaned until reconciliation reclaims it.
    #[error("Partial failure: blob '{key}' is orphaned ({cause}; cleanup failed: {compensation})")]
    PartialFailure {
        key: String,
        cause: String,
        compensation: String,
    },
}

impl LifecycleError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::Store(_) => ErrorKind::StoreError,
            Self::PartialFailure { .. } => ErrorKind::PartialFailure,
        }
    }

    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Expired { .. } => 410,
            Self::Validation(v) => v.http_status(),
            Self::StorageUnavailable(_) => 503,
            Self::Store(_) | Self::PartialFailure { .. } => 500,
        }
    }
}

impl From<DatabaseError> for LifecycleError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound { entity, key } => Self::NotFound { entity, key },
            other => Self::Store(other),
        }
    }
}

impl From<CoreError> for LifecycleError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidAssetPath { path, reason } => {
                Self::Validation(ValidationError::InvalidAssetPath(format!("{path}: {reason}")))
            }
            other => Self::Store(DatabaseError::Other(anyhow::Error::new(other))),
        }
    }
}
