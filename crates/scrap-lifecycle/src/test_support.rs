//! Shared test utilities for scrap-lifecycle unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use bytes::Bytes;
    use scrap_blob::{Blob, BlobError, BlobMeta, BlobStore, ObjectBlobStore};
    use scrap_db::MetadataStore;

    use crate::Scrapbook;

    /// In-memory blob store that records writes and can be told to fail.
    pub struct RecordingBlobStore {
        inner: ObjectBlobStore,
        puts: Mutex<Vec<String>>,
        pub fail_puts: AtomicBool,
        pub fail_deletes: AtomicBool,
    }

    impl RecordingBlobStore {
        pub fn new() -> Self {
            Self {
                inner: ObjectBlobStore::in_memory(),
                puts: Mutex::new(Vec::new()),
                fail_puts: AtomicBool::new(false),
                fail_deletes: AtomicBool::new(false),
            }
        }

        /// Keys of every successful put, in order.
        pub fn put_keys(&self) -> Vec<String> {
            self.puts.lock().unwrap().clone()
        }

        /// The underlying store, bypassing failure injection.
        pub const fn inner(&self) -> &ObjectBlobStore {
            &self.inner
        }
    }

    #[async_trait]
    impl BlobStore for RecordingBlobStore {
        fn backend(&self) -> &'static str {
            "recording"
        }

        async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), BlobError> {
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(BlobError::Unavailable("injected put failure".into()));
            }
            self.inner.put(key, bytes, content_type).await?;
            self.puts.lock().unwrap().push(key.to_string());
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Blob, BlobError> {
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> Result<(), BlobError> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(BlobError::Unavailable("injected delete failure".into()));
            }
            self.inner.delete(key).await
        }

        async fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
            self.inner.list(prefix).await
        }

        async fn probe(&self) -> Result<(), BlobError> {
            self.inner.probe().await
        }
    }

    pub struct TestHarness {
        pub scrapbook: Scrapbook,
        pub blobs: Arc<RecordingBlobStore>,
        pub store: Arc<MetadataStore>,
    }

    /// Managers over an in-memory database and a recording blob store.
    pub async fn harness() -> TestHarness {
        let store = Arc::new(MetadataStore::open_local(":memory:").await.unwrap());
        let blobs = Arc::new(RecordingBlobStore::new());
        let scrapbook = Scrapbook::new(
            Arc::clone(&store),
            Some(Arc::clone(&blobs) as Arc<dyn BlobStore>),
        );
        TestHarness {
            scrapbook,
            blobs,
            store,
        }
    }

    /// Managers with no object store.
    pub async fn degraded() -> Scrapbook {
        let store = Arc::new(MetadataStore::open_local(":memory:").await.unwrap());
        Scrapbook::new(store, None)
    }

    /// `len` bytes starting with the PNG signature.
    pub fn png(len: usize) -> Bytes {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(len.max(8), 0);
        bytes.truncate(len);
        Bytes::from(bytes)
    }
}
