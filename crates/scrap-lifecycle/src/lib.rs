//! # scrap-lifecycle
//!
//! Lifecycle managers that keep the metadata store and the object store
//! consistent.
//!
//! - [`AssetManager`]: upload with compensation, best-effort delete,
//!   read-through serving, orphan reconciliation
//! - [`ProjectManager`]: validated project CRUD, cascading delete, scene objects
//! - [`SharedLinkManager`]: token issue/resolve/revoke and the expiry sweep
//!
//! [`Scrapbook`] wires all three to one pair of stores and reports health.

pub mod asset;
pub mod error;
pub mod project;
pub mod shared_link;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use scrap_blob::{BlobStore, ObjectBlobStore};
use scrap_config::ScrapConfig;
use scrap_core::responses::{ComponentStatus, HealthReport, OverallStatus};
use scrap_db::MetadataStore;

pub use asset::{AssetManager, DeletedAsset, NewUpload, ReconcileReport};
pub use error::{LifecycleError, ValidationError};
pub use project::{ObjectDraft, ProjectChanges, ProjectManager};
pub use shared_link::SharedLinkManager;

const STORAGE_NOT_CONFIGURED: &str = "object storage is not configured";

/// The three managers over one metadata store and an optional object store.
#[derive(Clone)]
pub struct Scrapbook {
    store: Arc<MetadataStore>,
    blobs: Option<Arc<dyn BlobStore>>,
    /// Why the object store is missing, when it is.
    storage_issue: Option<String>,
    assets: AssetManager,
    projects: ProjectManager,
    links: SharedLinkManager,
}

impl Scrapbook {
    /// Wire the managers to the given stores. `blobs: None` runs degraded.
    pub fn new(store: Arc<MetadataStore>, blobs: Option<Arc<dyn BlobStore>>) -> Self {
        let projects = ProjectManager::new(Arc::clone(&store));
        Self {
            assets: AssetManager::new(Arc::clone(&store), blobs.clone()),
            links: SharedLinkManager::new(Arc::clone(&store), projects.clone()),
            projects,
            storage_issue: blobs.is_none().then(|| STORAGE_NOT_CONFIGURED.to_string()),
            store,
            blobs,
        }
    }

    /// Open both stores from configuration.
    ///
    /// The metadata store is required. The object store is optional: if it is
    /// not configured, cannot be built, or does not answer a probe, the
    /// managers run degraded and the reason is kept for [`Self::health`].
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Store` if the metadata store cannot be opened.
    pub async fn from_config(config: &ScrapConfig) -> Result<Self, LifecycleError> {
        let store = Arc::new(MetadataStore::from_config(&config.database).await?);

        let (blobs, storage_issue) = match ObjectBlobStore::from_config(&config.storage) {
            Ok(None) => (None, Some(STORAGE_NOT_CONFIGURED.to_string())),
            Ok(Some(blobs)) => match blobs.probe().await {
                Ok(()) => {
                    tracing::debug!(backend = blobs.backend(), "object store reachable");
                    (Some(Arc::new(blobs) as Arc<dyn BlobStore>), None)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "object store unreachable; running degraded");
                    (None, Some(e.to_string()))
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "object store misconfigured; running degraded");
                (None, Some(e.to_string()))
            }
        };

        let mut scrapbook = Self::new(store, blobs);
        scrapbook.storage_issue = storage_issue;
        scrapbook.assets = scrapbook
            .assets
            .with_reconcile_grace(grace_from_secs(config.general.reconcile_grace_secs));
        Ok(scrapbook)
    }

    #[must_use]
    pub const fn assets(&self) -> &AssetManager {
        &self.assets
    }

    #[must_use]
    pub const fn projects(&self) -> &ProjectManager {
        &self.projects
    }

    #[must_use]
    pub const fn links(&self) -> &SharedLinkManager {
        &self.links
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.blobs.is_none()
    }

    /// Probe both stores.
    pub async fn health(&self) -> HealthReport {
        let (database, database_error) = match self.store.ping().await {
            Ok(()) => (ComponentStatus::Ok, None),
            Err(e) => (ComponentStatus::Error, Some(e.to_string())),
        };

        let (storage, storage_error) = match &self.blobs {
            None => (ComponentStatus::Unavailable, self.storage_issue.clone()),
            Some(blobs) => match blobs.probe().await {
                Ok(()) => (ComponentStatus::Ok, None),
                Err(e) => (ComponentStatus::Error, Some(e.to_string())),
            },
        };

        let status = if database == ComponentStatus::Ok && storage == ComponentStatus::Ok {
            OverallStatus::Ok
        } else {
            OverallStatus::Degraded
        };
        HealthReport {
            status,
            database,
            database_error,
            storage,
            storage_error,
        }
    }
}

fn grace_from_secs(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}
