//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default page size for project listings.
const fn default_page_limit() -> i64 {
    10
}

/// Default interval between expired-link sweeps.
const fn default_sweep_interval_secs() -> u64 {
    3600
}

/// Minimum age before an unreferenced blob is treated as orphaned.
const fn default_reconcile_grace_secs() -> u64 {
    900
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default result limit for project listings.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: i64,

    /// Seconds between expired shared-link sweeps in `link sweep --watch`.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Blobs younger than this are never reclaimed by reconciliation, so an
    /// upload between its blob write and its metadata write is left alone.
    #[serde(default = "default_reconcile_grace_secs")]
    pub reconcile_grace_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_page_limit: default_page_limit(),
            sweep_interval_secs: default_sweep_interval_secs(),
            reconcile_grace_secs: default_reconcile_grace_secs(),
        }
    }
}
