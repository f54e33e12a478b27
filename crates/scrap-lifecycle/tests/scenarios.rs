//! End-to-end flows through the managers: upload and serve, rejection,
//! share resolution, and the expired-link sweep.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use scrap_blob::{BlobStore, ObjectBlobStore};
use scrap_core::enums::ErrorKind;
use scrap_core::responses::OverallStatus;
use scrap_db::MetadataStore;
use scrap_lifecycle::{LifecycleError, NewUpload, Scrapbook, ValidationError};

async fn scrapbook_with(blobs: Arc<ObjectBlobStore>) -> Scrapbook {
    let store = Arc::new(MetadataStore::open_local(":memory:").await.unwrap());
    Scrapbook::new(store, Some(blobs as Arc<dyn BlobStore>))
}

fn photo(len: usize) -> Bytes {
    Bytes::from((0..len).map(|i| (i % 251) as u8).collect::<Vec<_>>())
}

#[tokio::test]
async fn uploaded_photo_is_served_back_byte_for_byte() {
    let blobs = Arc::new(ObjectBlobStore::in_memory());
    let scrapbook = scrapbook_with(Arc::clone(&blobs)).await;
    let project = scrapbook
        .projects()
        .create("Summer 2024", "20x30", None)
        .await
        .unwrap();

    let content = photo(5 * 1024 * 1024);
    let asset = scrapbook
        .assets()
        .upload(
            project.id,
            NewUpload::new("photo.png", content.clone()).with_declared_type("image/png"),
        )
        .await
        .unwrap();
    assert_eq!(asset.size_bytes, 5 * 1024 * 1024);
    assert_eq!(asset.url, format!("/api/assets/{}", asset.storage_key));

    let blob = scrapbook.assets().serve_path(&asset.url).await.unwrap();
    assert_eq!(blob.size, 5 * 1024 * 1024);
    assert_eq!(blob.content_type, "image/png");
    assert_eq!(blob.into_bytes().await.unwrap(), content);
}

#[tokio::test]
async fn jpeg_is_rejected_before_anything_is_written() {
    let blobs = Arc::new(ObjectBlobStore::in_memory());
    let scrapbook = scrapbook_with(Arc::clone(&blobs)).await;
    let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();

    let err = scrapbook
        .assets()
        .upload(project.id, NewUpload::new("photo.jpg", photo(1024)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Validation(ValidationError::UnsupportedMediaType { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(err.http_status(), 415);

    assert!(blobs.list("projects/").await.unwrap().is_empty());
    assert!(scrapbook.assets().list(project.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_to_missing_project_is_not_found() {
    let blobs = Arc::new(ObjectBlobStore::in_memory());
    let scrapbook = scrapbook_with(Arc::clone(&blobs)).await;

    let err = scrapbook
        .assets()
        .upload(77, NewUpload::new("photo.png", photo(16)))
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert!(blobs.list("projects/").await.unwrap().is_empty());
}

#[tokio::test]
async fn serving_unknown_or_malformed_keys() {
    let scrapbook = scrapbook_with(Arc::new(ObjectBlobStore::in_memory())).await;

    let missing = scrapbook
        .assets()
        .serve_path("/api/assets/projects/1/assets/0123456789abcdef0123456789abcdef.png")
        .await
        .unwrap_err();
    assert_eq!(missing.http_status(), 404);

    let traversal = scrapbook
        .assets()
        .serve_path("/api/assets/projects/1/assets/../../secret.png")
        .await
        .unwrap_err();
    assert_eq!(traversal.http_status(), 400);
}

#[tokio::test]
async fn resolving_twice_gives_the_same_view() {
    let scrapbook = scrapbook_with(Arc::new(ObjectBlobStore::in_memory())).await;
    let project = scrapbook
        .projects()
        .create("Shared", "20x20", None)
        .await
        .unwrap();
    scrapbook
        .assets()
        .upload(project.id, NewUpload::new("a.png", photo(64)))
        .await
        .unwrap();
    let link = scrapbook
        .links()
        .issue(project.id, Some(Utc::now() + Duration::days(7)))
        .await
        .unwrap();

    let first = scrapbook.links().resolve(&link.token).await.unwrap();
    let second = scrapbook.links().resolve(&link.token).await.unwrap();
    assert_eq!(first, second);
    assert!(first.is_shared);
    assert_eq!(first.shared_link, link);
    assert_eq!(first.project.project.id, project.id);
    assert_eq!(first.project.assets.len(), 1);
}

#[tokio::test]
async fn sweep_removes_only_expired_links() {
    let scrapbook = scrapbook_with(Arc::new(ObjectBlobStore::in_memory())).await;
    let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();
    let now = Utc::now();

    for hours in 1..=3 {
        scrapbook
            .links()
            .issue(project.id, Some(now - Duration::hours(hours)))
            .await
            .unwrap();
    }
    let live = scrapbook
        .links()
        .issue(project.id, Some(now + Duration::hours(1)))
        .await
        .unwrap();
    let forever = scrapbook.links().issue(project.id, None).await.unwrap();

    assert_eq!(scrapbook.links().sweep_expired_at(now).await.unwrap(), 3);
    assert_eq!(scrapbook.links().sweep_expired_at(now).await.unwrap(), 0);

    let mut remaining: Vec<_> = scrapbook
        .links()
        .list(project.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.token)
        .collect();
    remaining.sort();
    let mut expected = vec![live.token, forever.token];
    expected.sort();
    assert_eq!(remaining, expected);
}

#[tokio::test]
async fn local_filesystem_backend_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = Arc::new(ObjectBlobStore::local(dir.path()).unwrap());
    let scrapbook = scrapbook_with(blobs).await;
    let project = scrapbook.projects().create("p", "20x20", None).await.unwrap();

    let content = photo(4096);
    let asset = scrapbook
        .assets()
        .upload(project.id, NewUpload::new("photo.png", content.clone()))
        .await
        .unwrap();
    assert!(dir.path().join(&asset.storage_key).exists());

    let served = scrapbook.assets().serve_path(&asset.url).await.unwrap();
    assert_eq!(served.into_bytes().await.unwrap(), content);
    assert_eq!(scrapbook.health().await.status, OverallStatus::Ok);
}
