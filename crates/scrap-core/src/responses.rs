//! Response envelopes handed to the API-facing layer.
//!
//! Every operation result is rendered as an [`ApiResponse`]; the paginated
//! project listing uses [`PaginatedResponse`] with a [`PaginationMeta`] block.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ProjectDetail, SharedLink};
use crate::enums::ErrorKind;
use crate::pagination::Page;

/// Standard success/failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            kind: None,
            error: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            kind: Some(kind),
            error: Some(error.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload (deletes, revokes).
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            kind: None,
            error: None,
        }
    }
}

/// Pagination block of a listing response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Envelope for a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page(message: impl Into<String>, page: Page<T>) -> Self {
        let meta = PaginationMeta {
            page: page.request.page,
            limit: page.request.limit,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            success: true,
            message: message.into(),
            data: page.items,
            meta,
        }
    }
}

/// What an unauthenticated viewer receives when resolving a share token.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SharedProject {
    pub project: ProjectDetail,
    pub shared_link: SharedLink,
    pub is_shared: bool,
}

/// Health of one backing store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Ok,
    Unavailable,
    Error,
}

/// Overall service health.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Ok,
    Degraded,
}

/// Detailed health report covering both stores.
///
/// Storage being unavailable degrades the service but does not fail it:
/// metadata reads and listings still work.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub database: ComponentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
    pub storage: ComponentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,
}

impl HealthReport {
    /// Whether the metadata store, the one required dependency, is healthy.
    #[must_use]
    pub fn is_serving(&self) -> bool {
        self.database == ComponentStatus::Ok
    }
}
