//! Metadata store handle shared by every lifecycle manager.
//!
//! `MetadataStore` wraps `ScrapDb` with a reader/writer lock. All repository
//! methods are implemented as `impl MetadataStore` blocks in [`crate::repos`].

use scrap_config::DatabaseConfig;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ScrapDb;
use crate::error::DatabaseError;

/// The metadata store adapter.
///
/// Every mutation holds the write side of the lock for its whole duration, so
/// the process acts as a single logical writer. Reads share the read side and
/// therefore never observe a transaction that has not finished. Reads run
/// concurrently with each other.
pub struct MetadataStore {
    db: ScrapDb,
    lock: RwLock<()>,
}

impl MetadataStore {
    /// Open a local store at `path`, or `:memory:` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = ScrapDb::open_local(path).await?;
        Ok(Self::from_db(db))
    }

    /// Open the store described by the `[database]` config section.
    ///
    /// # Errors
    ///
    /// Same as [`Self::open_local`].
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Self::open_local(&config.path).await
    }

    /// Create from an existing `ScrapDb`.
    #[must_use]
    pub fn from_db(db: ScrapDb) -> Self {
        Self {
            db,
            lock: RwLock::new(()),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ScrapDb {
        &self.db
    }

    pub(crate) fn conn(&self) -> &libsql::Connection {
        self.db.conn()
    }

    /// Acquire the single-writer lock. Held until the guard drops.
    ///
    /// Code holding this guard must read through the `fetch_*` helpers, never
    /// through the public getters, which take the read side.
    pub(crate) async fn write_lock(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().await
    }

    /// Acquire a shared read lock. Held until the guard drops.
    pub(crate) async fn read_lock(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().await
    }

    /// Check that the database answers queries.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the probe query fails.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        let _guard = self.read_lock().await;
        self.db.ping().await
    }
}

/// Commit `tx` if `result` is `Ok`, roll it back otherwise.
///
/// A failed rollback is logged; the original error is still returned.
pub(crate) async fn finish_transaction<T>(
    tx: libsql::Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "transaction rollback failed");
            }
            Err(e)
        }
    }
}
