//! Shared link repository: token rows and the expiry sweep.

use chrono::{DateTime, SubsecRound, Utc};

use scrap_core::entities::SharedLink;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, get_opt_string, now, parse_datetime, parse_optional_datetime};
use crate::store::MetadataStore;

const SELECT_COLS: &str = "id, project_id, token, expires_at, created_at";

fn row_to_link(row: &libsql::Row) -> Result<SharedLink, DatabaseError> {
    Ok(SharedLink {
        id: row.get(0)?,
        project_id: row.get(1)?,
        token: row.get(2)?,
        expires_at: parse_optional_datetime(get_opt_string(row, 3)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

async fn fetch_link(conn: &libsql::Connection, token: &str) -> Result<SharedLink, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM shared_links WHERE token = ?1"),
            [token],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("shared link", token))?;
    row_to_link(&row)
}

impl MetadataStore {
    /// Insert a shared link. A duplicate token surfaces as `Constraint`.
    pub async fn insert_shared_link(
        &self,
        project_id: i64,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<SharedLink, DatabaseError> {
        let now = now();
        let expires_param = expires_at.map_or(libsql::Value::Null, |e| fmt_datetime(e).into());

        let _guard = self.write_lock().await;
        let inserted = self
            .conn()
            .execute(
                "INSERT INTO shared_links (project_id, token, expires_at, created_at)
                 SELECT ?1, ?2, ?3, ?4 FROM projects WHERE id = ?1 AND state = 'active'",
                libsql::params![project_id, token, expires_param, fmt_datetime(now)],
            )
            .await?;
        if inserted == 0 {
            return Err(DatabaseError::not_found("project", project_id));
        }
        let id = self.conn().last_insert_rowid();

        Ok(SharedLink {
            id,
            project_id,
            token: token.to_string(),
            expires_at: expires_at.map(|e| e.trunc_subsecs(6)),
            created_at: now,
        })
    }

    pub async fn get_shared_link(&self, token: &str) -> Result<SharedLink, DatabaseError> {
        let _guard = self.read_lock().await;
        fetch_link(self.conn(), token).await
    }

    /// Links of a project, newest first.
    pub async fn list_shared_links(
        &self,
        project_id: i64,
    ) -> Result<Vec<SharedLink>, DatabaseError> {
        let _guard = self.read_lock().await;
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM shared_links WHERE project_id = ?1
                     ORDER BY created_at DESC, id DESC"
                ),
                [project_id],
            )
            .await?;

        let mut links = Vec::new();
        while let Some(row) = rows.next().await? {
            links.push(row_to_link(&row)?);
        }
        Ok(links)
    }

    pub async fn delete_shared_link(&self, token: &str) -> Result<SharedLink, DatabaseError> {
        let _guard = self.write_lock().await;
        let link = fetch_link(self.conn(), token).await?;
        self.conn()
            .execute("DELETE FROM shared_links WHERE token = ?1", [token])
            .await?;
        Ok(link)
    }

    /// Delete every link whose expiry is set and strictly before `cutoff`.
    pub async fn delete_expired_links(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let _guard = self.write_lock().await;
        let removed = self
            .conn()
            .execute(
                "DELETE FROM shared_links WHERE expires_at IS NOT NULL AND expires_at < ?1",
                [fmt_datetime(cutoff)],
            )
            .await?;
        Ok(removed)
    }
}
