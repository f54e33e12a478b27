//! Asset repository: metadata rows for uploaded blobs.

use std::collections::HashSet;

use scrap_core::entities::Asset;
use scrap_core::keys::asset_reference;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, now, parse_datetime};
use crate::store::MetadataStore;

const SELECT_COLS: &str =
    "id, project_id, filename, storage_key, content_type, size_bytes, uploaded_at";

fn row_to_asset(row: &libsql::Row) -> Result<Asset, DatabaseError> {
    let storage_key: String = row.get(3)?;
    Ok(Asset {
        id: row.get(0)?,
        project_id: row.get(1)?,
        filename: row.get(2)?,
        url: asset_reference(&storage_key),
        storage_key,
        content_type: row.get(4)?,
        size_bytes: row.get(5)?,
        uploaded_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

async fn fetch_asset(conn: &libsql::Connection, id: i64) -> Result<Asset, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM assets WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("asset", id))?;
    row_to_asset(&row)
}

/// Fields of an asset row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewAsset<'a> {
    pub project_id: i64,
    pub filename: &'a str,
    pub storage_key: &'a str,
    pub content_type: &'a str,
    pub size_bytes: i64,
}

impl MetadataStore {
    /// Insert an asset row. The owning project must exist and be active.
    pub async fn insert_asset(&self, new: &NewAsset<'_>) -> Result<Asset, DatabaseError> {
        let now = now();

        let _guard = self.write_lock().await;
        let inserted = self
            .conn()
            .execute(
                "INSERT INTO assets (project_id, filename, storage_key, content_type, size_bytes, uploaded_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6 FROM projects WHERE id = ?1 AND state = 'active'",
                libsql::params![
                    new.project_id,
                    new.filename,
                    new.storage_key,
                    new.content_type,
                    new.size_bytes,
                    fmt_datetime(now)
                ],
            )
            .await?;
        if inserted == 0 {
            return Err(DatabaseError::not_found("project", new.project_id));
        }
        let id = self.conn().last_insert_rowid();

        Ok(Asset {
            id,
            project_id: new.project_id,
            filename: new.filename.to_string(),
            storage_key: new.storage_key.to_string(),
            url: asset_reference(new.storage_key),
            content_type: new.content_type.to_string(),
            size_bytes: new.size_bytes,
            uploaded_at: now,
        })
    }

    pub async fn get_asset(&self, id: i64) -> Result<Asset, DatabaseError> {
        let _guard = self.read_lock().await;
        fetch_asset(self.conn(), id).await
    }

    pub async fn get_asset_by_key(&self, storage_key: &str) -> Result<Asset, DatabaseError> {
        let _guard = self.read_lock().await;
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM assets WHERE storage_key = ?1"),
                [storage_key],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("asset", storage_key))?;
        row_to_asset(&row)
    }

    /// Assets of a project, newest first.
    pub async fn list_assets(&self, project_id: i64) -> Result<Vec<Asset>, DatabaseError> {
        let _guard = self.read_lock().await;
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM assets WHERE project_id = ?1
                     ORDER BY uploaded_at DESC, id DESC"
                ),
                [project_id],
            )
            .await?;

        let mut assets = Vec::new();
        while let Some(row) = rows.next().await? {
            assets.push(row_to_asset(&row)?);
        }
        Ok(assets)
    }

    /// Every storage key that starts with `prefix`.
    pub async fn storage_keys_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<HashSet<String>, DatabaseError> {
        let _guard = self.read_lock().await;
        let mut rows = self
            .conn()
            .query(
                "SELECT storage_key FROM assets WHERE substr(storage_key, 1, length(?1)) = ?1",
                [prefix],
            )
            .await?;

        let mut keys = HashSet::new();
        while let Some(row) = rows.next().await? {
            keys.insert(row.get::<String>(0)?);
        }
        Ok(keys)
    }

    /// Delete an asset row and return it. Objects referencing it keep existing
    /// with their `asset_id` cleared.
    pub async fn delete_asset(&self, id: i64) -> Result<Asset, DatabaseError> {
        let _guard = self.write_lock().await;
        let asset = fetch_asset(self.conn(), id).await?;
        self.conn()
            .execute("DELETE FROM assets WHERE id = ?1", [id])
            .await?;
        Ok(asset)
    }
}
