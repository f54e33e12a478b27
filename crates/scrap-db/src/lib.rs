//! # scrap-db
//!
//! libSQL metadata store for the scrapbook: projects, assets, scene objects,
//! and shared links.
//!
//! [`ScrapDb`] owns the raw database handle and schema. [`store::MetadataStore`]
//! wraps it with a reader/writer lock, and every repository method is
//! implemented as `impl MetadataStore` under [`repos`].

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod store;
pub mod updates;

#[cfg(test)]
mod test_support;

use std::path::Path;

use error::DatabaseError;
use libsql::Builder;

pub use repos::asset::NewAsset;
pub use repos::object::NewObject;
pub use repos::project::ProjectCascade;
pub use store::MetadataStore;

/// Raw database handle for the metadata store.
pub struct ScrapDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl ScrapDb {
    /// Open a local database at the given path, or `:memory:`.
    ///
    /// Creates the parent directory of a file path if needed and runs
    /// migrations on every open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Unavailable` if the database cannot be opened, or
    /// `DatabaseError::Migration` if the schema cannot be applied.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DatabaseError::Unavailable(format!(
                            "cannot create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Unavailable(format!("open {path}: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Unavailable(format!("connect {path}: {e}")))?;

        // Foreign keys are per-connection in SQLite
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let scrap_db = Self { db, conn };
        scrap_db.run_migrations().await?;
        tracing::debug!(path, "metadata store opened");
        Ok(scrap_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Round-trip a trivial query to check the connection.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        let mut rows = self.conn.query("SELECT 1", ()).await?;
        rows.next()
            .await?
            .ok_or_else(|| DatabaseError::Query("SELECT 1 returned no rows".into()))?;
        Ok(())
    }
}
