//! Frame sizes, project lifecycle states, and stable error kinds.
//!
//! Storage enums serialize to the exact strings kept in the metadata store and
//! expose `as_str()` for SQL parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// FrameSize
// ---------------------------------------------------------------------------

/// Physical frame size of a scrapbook page, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FrameSize {
    #[serde(rename = "20x20")]
    Size20x20,
    #[serde(rename = "20x30")]
    Size20x30,
}

impl FrameSize {
    /// Every supported frame size.
    pub const ALL: [Self; 2] = [Self::Size20x20, Self::Size20x30];

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Size20x20 => "20x20",
            Self::Size20x30 => "20x30",
        }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameSize {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s.trim())
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "unsupported frame size '{s}' (expected one of: 20x20, 20x30)"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// ProjectState
// ---------------------------------------------------------------------------

/// Lifecycle state of a project row.
///
/// ```text
/// active → deleted
/// ```
///
/// Deleting a project only flips the project row to `deleted`; its assets,
/// objects, and shared links are removed outright in the same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Active,
    Deleted,
}

impl ProjectState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Deleted],
            Self::Deleted => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Stable, caller-facing classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Expired,
    ValidationError,
    StorageUnavailable,
    StoreError,
    PartialFailure,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::ValidationError => "validation_error",
            Self::StorageUnavailable => "storage_unavailable",
            Self::StoreError => "store_error",
            Self::PartialFailure => "partial_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
