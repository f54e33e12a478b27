//! Page/limit normalization and page-count arithmetic for project listings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Page size used when the caller passes none or a non-positive one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// A normalized page request (1-based page, bounded limit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Normalize raw caller input.
    ///
    /// `page < 1` becomes 1. `limit > MAX_LIMIT` is clamped to `MAX_LIMIT`;
    /// `limit < 1` falls back to `DEFAULT_LIMIT`.
    #[must_use]
    pub const fn new(page: i64, limit: i64) -> Self {
        let page = if page < 1 { 1 } else { page };
        let limit = if limit < 1 {
            DEFAULT_LIMIT
        } else if limit > MAX_LIMIT {
            MAX_LIMIT
        } else {
            limit
        };
        Self { page, limit }
    }

    /// Normalize optional caller input, filling in defaults.
    #[must_use]
    pub const fn from_options(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) => p,
            None => 1,
        };
        let limit = match limit {
            Some(l) => l,
            None => DEFAULT_LIMIT,
        };
        Self::new(page, limit)
    }

    /// Row offset of the first item on this page.
    #[must_use]
    pub const fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_LIMIT)
    }
}

/// `ceil(total / limit)`; zero items means zero pages.
#[must_use]
pub const fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// One page of items plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn total_pages(&self) -> i64 {
        total_pages(self.total, self.request.limit)
    }
}
