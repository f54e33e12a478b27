//! Database error types for scrap-db.

use thiserror::Error;

/// Errors from metadata store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// No row matches the given id or token.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A CHECK, UNIQUE, or FOREIGN KEY constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The database could not be reached (open, IO, or lock failure).
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// A SQL query failed or returned data that could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error that fits no narrower category.
    #[error("libSQL error: {0}")]
    LibSql(#[source] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub const fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}

impl From<libsql::Error> for DatabaseError {
    fn from(e: libsql::Error) -> Self {
        let msg = e.to_string();
        let lower = msg.to_ascii_lowercase();
        if lower.contains("constraint failed") || lower.contains("constraint violation") {
            Self::Constraint(msg)
        } else if lower.contains("unable to open")
            || lower.contains("disk i/o")
            || lower.contains("database is locked")
            || lower.contains("connection")
        {
            Self::Unavailable(msg)
        } else {
            Self::LibSql(e)
        }
    }
}
