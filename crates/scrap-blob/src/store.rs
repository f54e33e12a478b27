//! `object_store`-backed implementation of [`BlobStore`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream};
use futures_util::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, ClientOptions, ObjectStore, PutOptions, PutPayload,
};
use scrap_config::{StorageBackend, StorageConfig};

use crate::{Blob, BlobError, BlobMeta, BlobStore, content_type_for};

/// Key probed by [`BlobStore::probe`]. It never exists; a `NotFound` answer
/// proves the store is reachable.
const PROBE_KEY: &str = "health/probe";

/// Default bound on a single object store call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blob store over any `object_store` backend.
#[derive(Debug, Clone)]
pub struct ObjectBlobStore {
    inner: Arc<dyn ObjectStore>,
    backend: &'static str,
    /// Whether the backend persists per-object attributes such as the content
    /// type. When it does not, the type is inferred from the key on read.
    supports_attributes: bool,
    timeout: Duration,
}

fn object_path(key: &str) -> Result<Path, BlobError> {
    if key.is_empty() {
        return Err(BlobError::InvalidKey {
            key: key.to_string(),
            reason: "key is empty".into(),
        });
    }
    Path::parse(key).map_err(|e| BlobError::InvalidKey {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

impl ObjectBlobStore {
    /// Process-local store, for tests and demos.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            backend: "memory",
            supports_attributes: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Store rooted at a local directory, created if missing.
    ///
    /// # Errors
    ///
    /// Returns `BlobError::Unavailable` if the directory cannot be created or
    /// opened.
    pub fn local(root: impl AsRef<std::path::Path>) -> Result<Self, BlobError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| {
            BlobError::Unavailable(format!("cannot create {}: {e}", root.display()))
        })?;
        let fs = LocalFileSystem::new_with_prefix(root).map_err(|e| {
            BlobError::Unavailable(format!("cannot open {}: {e}", root.display()))
        })?;
        Ok(Self {
            inner: Arc::new(fs),
            backend: "local",
            supports_attributes: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Store on an S3-compatible service (MinIO, R2, AWS).
    ///
    /// # Errors
    ///
    /// Returns `BlobError::Unavailable` if a required field is missing or the
    /// client cannot be built.
    pub fn s3(config: &StorageConfig) -> Result<Self, BlobError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let s3 = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_bucket_name(&config.bucket_name)
            .with_region(&config.region)
            .with_allow_http(config.allow_http)
            .with_client_options(ClientOptions::new().with_timeout(timeout))
            .build()
            .map_err(|e| BlobError::Unavailable(format!("s3 client: {e}")))?;
        Ok(Self {
            inner: Arc::new(s3),
            backend: "s3",
            supports_attributes: true,
            timeout,
        })
    }

    /// Build the store selected by the `[storage]` config section.
    ///
    /// Returns `Ok(None)` when no backend is configured, which puts the
    /// managers in degraded mode.
    ///
    /// # Errors
    ///
    /// Returns `BlobError::Unavailable` if the selected backend is incompletely
    /// configured or cannot be opened.
    pub fn from_config(config: &StorageConfig) -> Result<Option<Self>, BlobError> {
        if config.backend == StorageBackend::None {
            return Ok(None);
        }
        config
            .validate()
            .map_err(|e| BlobError::Unavailable(e.to_string()))?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let store = match config.backend {
            StorageBackend::None => return Ok(None),
            StorageBackend::Memory => Self::in_memory(),
            StorageBackend::Local => Self::local(&config.root)?,
            StorageBackend::S3 => Self::s3(config)?,
        };
        Ok(Some(store.with_timeout(timeout)))
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one object store call under the timeout.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, object_store::Error>> + Send,
    ) -> Result<T, BlobError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(BlobError::from),
            Err(_) => {
                tracing::warn!(
                    operation,
                    backend = self.backend,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "object store call timed out"
                );
                Err(BlobError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }
}

/// Apply the call timeout to every chunk of a download. A stalled chunk ends
/// the stream with [`BlobError::Timeout`].
fn bounded_chunks<S>(
    chunks: S,
    timeout: Duration,
    backend: &'static str,
) -> BoxStream<'static, Result<Bytes, BlobError>>
where
    S: Stream<Item = Result<Bytes, object_store::Error>> + Send + 'static,
{
    stream::unfold(Some(chunks.boxed()), move |state| async move {
        let mut chunks = state?;
        match tokio::time::timeout(timeout, chunks.next()).await {
            Ok(Some(chunk)) => Some((chunk.map_err(BlobError::from), Some(chunks))),
            Ok(None) => None,
            Err(_) => {
                tracing::warn!(
                    backend,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "blob download stalled"
                );
                let err = BlobError::Timeout {
                    operation: "get",
                    after: timeout,
                };
                Some((Err(err), None))
            }
        }
    })
    .boxed()
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    fn backend(&self) -> &'static str {
        self.backend
    }

    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), BlobError> {
        let path = object_path(key)?;
        let size = bytes.len();
        let opts = if self.supports_attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            PutOptions {
                attributes,
                ..PutOptions::default()
            }
        } else {
            PutOptions::default()
        };

        self.bounded("put", self.inner.put_opts(&path, PutPayload::from(bytes), opts))
            .await?;
        tracing::debug!(key, size, backend = self.backend, "blob stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Blob, BlobError> {
        let path = object_path(key)?;
        let result = match self.bounded("get", self.inner.get(&path)).await {
            Ok(result) => result,
            Err(BlobError::NotFound(_)) => return Err(BlobError::NotFound(key.to_string())),
            Err(e) => return Err(e),
        };

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map_or_else(|| content_type_for(key).to_string(), |v| v.to_string());
        let size = result.meta.size;
        let stream = bounded_chunks(result.into_stream(), self.timeout, self.backend);

        Ok(Blob {
            stream,
            size,
            content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = object_path(key)?;
        match self.bounded("delete", self.inner.delete(&path)).await {
            Ok(()) | Err(BlobError::NotFound(_)) => {
                tracing::debug!(key, backend = self.backend, "blob deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
        let trimmed = prefix.trim_end_matches('/');
        let prefix_path = if trimmed.is_empty() {
            None
        } else {
            Some(object_path(trimmed)?)
        };

        let metas: Vec<object_store::ObjectMeta> = self
            .bounded("list", self.inner.list(prefix_path.as_ref()).try_collect())
            .await?;

        Ok(metas
            .into_iter()
            .map(|meta| BlobMeta {
                key: meta.location.to_string(),
                size: meta.size,
                last_modified: meta.last_modified,
            })
            .collect())
    }

    async fn probe(&self) -> Result<(), BlobError> {
        let path = object_path(PROBE_KEY)?;
        match self.bounded("probe", self.inner.head(&path)).await {
            Ok(_) | Err(BlobError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
