//! # scrap-blob
//!
//! Object store adapter for asset blobs.
//!
//! [`BlobStore`] is the seam the lifecycle managers depend on. The production
//! implementation, [`ObjectBlobStore`], sits on the `object_store` crate and
//! can be backed by memory, a local directory, or an S3-compatible service.
//! Every call it makes is bounded by a timeout.

mod error;
mod store;

pub use error::BlobError;
pub use store::ObjectBlobStore;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

/// Content type assumed when nothing better is known.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A blob being read: a byte stream plus the metadata needed to serve it.
pub struct Blob {
    pub stream: BoxStream<'static, Result<Bytes, BlobError>>,
    pub size: u64,
    pub content_type: String,
}

impl Blob {
    /// Drain the stream into one buffer.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream yields.
    pub async fn into_bytes(mut self) -> Result<Bytes, BlobError> {
        let mut buf = BytesMut::with_capacity(usize::try_from(self.size).unwrap_or(0));
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob")
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// A listed blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Byte storage addressed by string keys.
///
/// `put` and `delete` are idempotent; deleting a missing key is not an error.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Store `bytes` under `key`, replacing any existing blob.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), BlobError>;

    /// Open the blob stored under `key`.
    async fn get(&self, key: &str) -> Result<Blob, BlobError>;

    /// Remove the blob stored under `key`, if any.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// List blobs whose key starts with the path prefix `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError>;

    /// Check that the store is reachable.
    async fn probe(&self) -> Result<(), BlobError>;
}

/// Content type for a key, from its extension.
#[must_use]
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
