//! Asset lifecycle: upload, delete, serve, list, and orphan reconciliation.
//!
//! An asset is a metadata row plus a blob. Upload writes the blob first and the
//! row second; if the row cannot be written the blob is deleted again. Delete
//! removes the blob on a best-effort basis and always removes the row.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use scrap_blob::{Blob, BlobError, BlobStore};
use scrap_core::entities::Asset;
use scrap_core::keys::{AssetKey, file_extension};
use scrap_db::{MetadataStore, NewAsset};
use serde::Serialize;

use crate::error::{LifecycleError, ValidationError};

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// The only media type assets may have.
pub const PNG_CONTENT_TYPE: &str = "image/png";

const ACCEPTED_EXTENSION: &str = ".png";
const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

/// Default age below which an unreferenced blob is left alone.
pub const DEFAULT_RECONCILE_GRACE: Duration = Duration::minutes(15);

/// Root prefix of every asset blob.
const ASSET_NAMESPACE: &str = "projects/";

/// An upload as received from the caller.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub filename: String,
    pub content: Bytes,
    /// Size the caller claims; the larger of this and the real length is checked.
    pub declared_size: Option<u64>,
    /// Content type the caller claims.
    pub declared_type: Option<String>,
}

impl NewUpload {
    pub fn new(filename: impl Into<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content,
            declared_size: None,
            declared_type: None,
        }
    }

    #[must_use]
    pub const fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_declared_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_type = Some(content_type.into());
        self
    }
}

/// Check media type and size. Returns the effective size.
///
/// # Errors
///
/// `UnsupportedMediaType` unless the filename ends in `.png` (any case) and the
/// declared type, if any, is `image/png` or `application/octet-stream`.
/// `PayloadTooLarge` if the effective size exceeds [`MAX_UPLOAD_BYTES`].
pub fn validate_upload(upload: &NewUpload) -> Result<u64, ValidationError> {
    let unsupported = || ValidationError::UnsupportedMediaType {
        filename: upload.filename.clone(),
        declared_type: upload.declared_type.clone(),
    };

    if !file_extension(&upload.filename).eq_ignore_ascii_case(ACCEPTED_EXTENSION) {
        return Err(unsupported());
    }
    if let Some(declared) = upload.declared_type.as_deref() {
        let essence = declared.split(';').next().unwrap_or_default().trim();
        if !essence.eq_ignore_ascii_case(PNG_CONTENT_TYPE)
            && !essence.eq_ignore_ascii_case(GENERIC_CONTENT_TYPE)
        {
            return Err(unsupported());
        }
    }

    let actual = u64::try_from(upload.content.len()).unwrap_or(u64::MAX);
    let size = upload.declared_size.map_or(actual, |d| d.max(actual));
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::PayloadTooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(size)
}

/// Last path component of a client-supplied filename.
fn display_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(filename)
}

/// Outcome of deleting an asset.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedAsset {
    pub asset: Asset,
    /// Whether the blob delete succeeded.
    pub blob_removed: bool,
    /// Why the blob delete failed or was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_error: Option<String>,
}

/// Outcome of an orphan reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Blobs found under the scanned prefix.
    pub scanned: usize,
    /// Blobs with a matching asset row.
    pub referenced: usize,
    /// Orphans younger than the grace period, left in place.
    pub skipped_recent: usize,
    /// Orphans deleted.
    pub removed: usize,
    /// Orphans whose delete failed.
    pub failed: usize,
}

#[derive(Clone)]
pub struct AssetManager {
    store: Arc<MetadataStore>,
    blobs: Option<Arc<dyn BlobStore>>,
    reconcile_grace: Duration,
}

impl AssetManager {
    pub fn new(store: Arc<MetadataStore>, blobs: Option<Arc<dyn BlobStore>>) -> Self {
        Self {
            store,
            blobs,
            reconcile_grace: DEFAULT_RECONCILE_GRACE,
        }
    }

    #[must_use]
    pub const fn with_reconcile_grace(mut self, grace: Duration) -> Self {
        self.reconcile_grace = grace;
        self
    }

    fn blobs(&self) -> Result<&Arc<dyn BlobStore>, LifecycleError> {
        self.blobs.as_ref().ok_or_else(|| {
            LifecycleError::StorageUnavailable("object storage is not configured".into())
        })
    }

    /// Store a PNG for a project.
    ///
    /// Checks run in order: project exists, media type, size, storage
    /// available. Nothing is written unless all pass. The blob is written
    /// before the row; a failed row insert deletes the blob again.
    pub async fn upload(
        &self,
        project_id: i64,
        upload: NewUpload,
    ) -> Result<Asset, LifecycleError> {
        self.store.get_project(project_id).await?;
        let size = validate_upload(&upload)?;
        let blobs = self.blobs()?;

        let key = AssetKey::generate(project_id, &upload.filename)?;
        let filename = display_name(&upload.filename).to_string();

        if let Err(e) = blobs
            .put(key.as_str(), upload.content, PNG_CONTENT_TYPE)
            .await
        {
            tracing::warn!(project_id, key = %key, error = %e, "asset blob write failed");
            return Err(LifecycleError::StorageUnavailable(e.to_string()));
        }

        let new = NewAsset {
            project_id,
            filename: &filename,
            storage_key: key.as_str(),
            content_type: PNG_CONTENT_TYPE,
            size_bytes: i64::try_from(size).unwrap_or(i64::MAX),
        };
        let db_err = match self.store.insert_asset(&new).await {
            Ok(asset) => {
                tracing::info!(project_id, asset_id = asset.id, key = %key, size, "asset uploaded");
                return Ok(asset);
            }
            Err(e) => e,
        };

        match blobs.delete(key.as_str()).await {
            Ok(()) => {
                tracing::warn!(
                    project_id,
                    key = %key,
                    error = %db_err,
                    "asset row insert failed; blob removed"
                );
                Err(db_err.into())
            }
            Err(cleanup_err) => {
                tracing::error!(
                    project_id,
                    key = %key,
                    error = %db_err,
                    cleanup_error = %cleanup_err,
                    "asset row insert failed and blob cleanup failed; blob is orphaned"
                );
                Err(LifecycleError::PartialFailure {
                    key: key.into_string(),
                    cause: db_err.to_string(),
                    compensation: cleanup_err.to_string(),
                })
            }
        }
    }

    /// Delete an asset. The blob delete is best effort and never blocks the
    /// metadata delete; objects referencing the asset lose their reference.
    pub async fn delete(&self, asset_id: i64) -> Result<DeletedAsset, LifecycleError> {
        let asset = self.store.get_asset(asset_id).await?;

        let blob_result = match self.blobs() {
            Ok(blobs) => blobs
                .delete(&asset.storage_key)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(ref e) = blob_result {
            tracing::warn!(
                asset_id,
                key = %asset.storage_key,
                error = %e,
                "asset blob delete failed; removing metadata anyway"
            );
        }

        let asset = self.store.delete_asset(asset_id).await?;
        tracing::info!(asset_id, project_id = asset.project_id, "asset deleted");
        Ok(DeletedAsset {
            asset,
            blob_removed: blob_result.is_ok(),
            blob_error: blob_result.err(),
        })
    }

    /// Stream the blob behind a validated key.
    pub async fn serve(&self, key: &AssetKey) -> Result<Blob, LifecycleError> {
        let blobs = self.blobs()?;
        match blobs.get(key.as_str()).await {
            Ok(blob) => Ok(blob),
            Err(BlobError::NotFound(_)) => Err(LifecycleError::not_found("asset", key)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "asset blob read failed");
                Err(LifecycleError::StorageUnavailable(e.to_string()))
            }
        }
    }

    /// Parse a caller path (`/api/assets/projects/...` or a bare key) and serve it.
    pub async fn serve_path(&self, path: &str) -> Result<Blob, LifecycleError> {
        let key = AssetKey::parse(path)?;
        self.serve(&key).await
    }

    /// Assets of a project, newest first.
    pub async fn list(&self, project_id: i64) -> Result<Vec<Asset>, LifecycleError> {
        self.store.get_project(project_id).await?;
        Ok(self.store.list_assets(project_id).await?)
    }

    /// Delete the named blobs unless an asset row still references them.
    ///
    /// Used right after a project delete with its `orphaned_keys`; no grace
    /// period applies because the owning rows are already gone.
    pub async fn purge(&self, keys: &[String]) -> Result<ReconcileReport, LifecycleError> {
        let blobs = self.blobs()?;
        let mut report = ReconcileReport {
            scanned: keys.len(),
            ..ReconcileReport::default()
        };
        for key in keys {
            match self.store.get_asset_by_key(key).await {
                Ok(_) => {
                    report.referenced += 1;
                    continue;
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
            match blobs.delete(key).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "blob purge failed");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Delete blobs that no asset row references.
    ///
    /// `scope` limits the pass to one project's prefix. Blobs modified within
    /// the grace period are skipped so uploads in flight are never touched.
    pub async fn reconcile(&self, scope: Option<i64>) -> Result<ReconcileReport, LifecycleError> {
        self.reconcile_at(scope, Utc::now()).await
    }

    /// [`Self::reconcile`] evaluated at a fixed instant.
    pub async fn reconcile_at(
        &self,
        scope: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<ReconcileReport, LifecycleError> {
        let blobs = self.blobs()?;
        let prefix = scope.map_or_else(|| ASSET_NAMESPACE.to_string(), AssetKey::project_prefix);

        let listed = blobs
            .list(&prefix)
            .await
            .map_err(|e| LifecycleError::StorageUnavailable(e.to_string()))?;
        let referenced = self.store.storage_keys_with_prefix(&prefix).await?;

        let mut report = ReconcileReport {
            scanned: listed.len(),
            ..ReconcileReport::default()
        };
        for meta in listed {
            if referenced.contains(&meta.key) {
                report.referenced += 1;
                continue;
            }
            if now - meta.last_modified < self.reconcile_grace {
                report.skipped_recent += 1;
                continue;
            }
            match blobs.delete(&meta.key).await {
                Ok(()) => {
                    tracing::info!(key = %meta.key, size = meta.size, "orphaned blob removed");
                    report.removed += 1;
                }
                Err(e) => {
                    tracing::warn!(key = %meta.key, error = %e, "orphaned blob delete failed");
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            prefix = %prefix,
            scanned = report.scanned,
            removed = report.removed,
            failed = report.failed,
            "reconciliation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::test_support::helpers::{TestHarness, harness, png};

    use super::*;

    #[rstest]
    #[case("photo.png", None)]
    #[case("PHOTO.PNG", None)]
    #[case("photo.Png", Some("image/png"))]
    #[case("photo.png", Some("application/octet-stream"))]
    #[case("photo.png", Some("image/png; charset=binary"))]
    fn accepted_uploads(#[case] filename: &str, #[case] declared: Option<&str>) {
        let mut upload = NewUpload::new(filename, png(16));
        upload.declared_type = declared.map(String::from);
        assert_eq!(validate_upload(&upload).unwrap(), 16);
    }

    #[rstest]
    #[case("photo.jpg", None)]
    #[case("photo", None)]
    #[case("photo.png.exe", None)]
    #[case("photo.png", Some("image/jpeg"))]
    #[case("photo.png", Some("text/plain"))]
    fn rejected_media_types(#[case] filename: &str, #[case] declared: Option<&str>) {
        let mut upload = NewUpload::new(filename, png(16));
        upload.declared_type = declared.map(String::from);
        assert!(matches!(
            validate_upload(&upload),
            Err(ValidationError::UnsupportedMediaType { .. })
        ));
    }

    #[test]
    fn size_limit_is_inclusive_and_uses_larger_claim() {
        let at_limit = NewUpload::new("a.png", Bytes::from(vec![0u8; 16]))
            .with_declared_size(MAX_UPLOAD_BYTES);
        assert_eq!(validate_upload(&at_limit).unwrap(), MAX_UPLOAD_BYTES);

        let over = NewUpload::new("a.png", Bytes::from(vec![0u8; 16]))
            .with_declared_size(MAX_UPLOAD_BYTES + 1);
        assert_eq!(
            validate_upload(&over),
            Err(ValidationError::PayloadTooLarge {
                size: MAX_UPLOAD_BYTES + 1,
                limit: MAX_UPLOAD_BYTES
            })
        );

        // an understated claim does not hide the real length
        let lying = NewUpload::new("a.png", Bytes::from(vec![0u8; 2048])).with_declared_size(1);
        assert_eq!(validate_upload(&lying).unwrap(), 2048);
    }

    #[test]
    fn display_name_drops_client_directories() {
        assert_eq!(display_name("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(display_name("../../photo.png"), "photo.png");
        assert_eq!(display_name("photo.png"), "photo.png");
    }

    #[tokio::test]
    async fn upload_writes_blob_then_row() {
        let TestHarness { scrapbook, blobs, .. } = harness().await;
        let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();

        let asset = scrapbook
            .assets()
            .upload(project.id, NewUpload::new("photo.png", png(64)))
            .await
            .unwrap();
        assert_eq!(asset.filename, "photo.png");
        assert_eq!(asset.content_type, PNG_CONTENT_TYPE);
        assert_eq!(asset.size_bytes, 64);
        assert!(asset.storage_key.starts_with(&format!("projects/{}/assets/", project.id)));
        assert!(asset.storage_key.ends_with(".png"));
        assert_eq!(blobs.put_keys(), vec![asset.storage_key.clone()]);
    }

    #[tokio::test]
    async fn failed_blob_write_writes_no_row() {
        let TestHarness { scrapbook, blobs, .. } = harness().await;
        let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();
        blobs.fail_puts.store(true, Ordering::SeqCst);

        let err = scrapbook
            .assets()
            .upload(project.id, NewUpload::new("photo.png", png(8)))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::StorageUnavailable(_)));
        assert!(scrapbook.assets().list(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_row_insert_with_failed_cleanup_is_partial_failure() {
        let TestHarness { scrapbook, blobs, store } = harness().await;
        let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();
        store
            .db()
            .conn()
            .execute_batch(
                "CREATE TRIGGER fail_asset_insert BEFORE INSERT ON assets
                 BEGIN SELECT RAISE(ABORT, 'injected metadata failure'); END;",
            )
            .await
            .unwrap();
        blobs.fail_deletes.store(true, Ordering::SeqCst);

        let err = scrapbook
            .assets()
            .upload(project.id, NewUpload::new("photo.png", png(8)))
            .await
            .unwrap_err();
        let LifecycleError::PartialFailure { key, cause, .. } = err else {
            panic!("expected PartialFailure, got {err:?}");
        };
        assert_eq!(blobs.put_keys(), vec![key.clone()]);
        assert!(cause.contains("injected metadata failure"));

        // the orphan is still there for reconciliation to find
        assert_eq!(blobs.inner().list("projects/").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_survives_blob_failure() {
        let TestHarness { scrapbook, blobs, .. } = harness().await;
        let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();
        let asset = scrapbook
            .assets()
            .upload(project.id, NewUpload::new("photo.png", png(8)))
            .await
            .unwrap();
        blobs.fail_deletes.store(true, Ordering::SeqCst);

        let deleted = scrapbook.assets().delete(asset.id).await.unwrap();
        assert!(!deleted.blob_removed);
        assert!(deleted.blob_error.is_some());
        assert!(scrapbook.assets().list(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reconcile_respects_grace_period() {
        let TestHarness { scrapbook, blobs, .. } = harness().await;
        let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();
        let kept = scrapbook
            .assets()
            .upload(project.id, NewUpload::new("kept.png", png(8)))
            .await
            .unwrap();
        let orphan = format!("projects/{}/assets/ffffffffffffffffffffffffffffffff.png", project.id);
        blobs
            .inner()
            .put(&orphan, png(8), PNG_CONTENT_TYPE)
            .await
            .unwrap();

        let fresh = scrapbook.assets().reconcile(Some(project.id)).await.unwrap();
        assert_eq!(
            fresh,
            ReconcileReport {
                scanned: 2,
                referenced: 1,
                skipped_recent: 1,
                removed: 0,
                failed: 0
            }
        );

        let later = Utc::now() + Duration::hours(1);
        let swept = scrapbook
            .assets()
            .reconcile_at(Some(project.id), later)
            .await
            .unwrap();
        assert_eq!(swept.removed, 1);
        let remaining = blobs.inner().list("projects/").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].key, kept.storage_key);
    }

    #[tokio::test]
    async fn purge_skips_referenced_keys() {
        let TestHarness { scrapbook, blobs, .. } = harness().await;
        let doomed = scrapbook.projects().create("a", "20x20", None).await.unwrap();
        let other = scrapbook.projects().create("b", "20x20", None).await.unwrap();
        let gone = scrapbook
            .assets()
            .upload(doomed.id, NewUpload::new("a.png", png(8)))
            .await
            .unwrap();
        let live = scrapbook
            .assets()
            .upload(other.id, NewUpload::new("b.png", png(8)))
            .await
            .unwrap();

        let cascade = scrapbook.projects().delete(doomed.id).await.unwrap();
        let mut keys = cascade.orphaned_keys;
        keys.push(live.storage_key.clone());

        let report = scrapbook.assets().purge(&keys).await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.referenced, 1);
        assert_eq!(report.removed, 1);

        let remaining = blobs.inner().list("projects/").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].key, live.storage_key);
        assert_ne!(remaining[0].key, gone.storage_key);
    }

    #[tokio::test]
    async fn degraded_mode_rejects_blob_operations_only() {
        let scrapbook = crate::test_support::helpers::degraded().await;
        let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();

        let err = scrapbook
            .assets()
            .upload(project.id, NewUpload::new("photo.png", png(8)))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::StorageUnavailable(_)));

        let key = AssetKey::generate(project.id, "photo.png").unwrap();
        assert!(matches!(
            scrapbook.assets().serve(&key).await,
            Err(LifecycleError::StorageUnavailable(_))
        ));
        assert!(scrapbook.assets().list(project.id).await.unwrap().is_empty());
    }
}
