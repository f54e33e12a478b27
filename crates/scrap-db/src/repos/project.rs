//! Project repository: CRUD, pagination, and the cascading soft delete.

use chrono::{DateTime, Utc};

use scrap_core::entities::{Project, SceneData};
use scrap_core::enums::{FrameSize, ProjectState};
use scrap_core::pagination::{Page, PageRequest};

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_opt_string, now, parse_datetime, parse_enum, parse_optional_datetime,
};
use crate::store::{MetadataStore, finish_transaction};
use crate::updates::project::ProjectUpdate;

const SELECT_COLS: &str =
    "id, title, frame_size, project_data, state, created_at, updated_at, deleted_at";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get(0)?,
        title: row.get(1)?,
        frame_size: parse_enum(&row.get::<String>(2)?)?,
        project_data: row.get::<Option<Vec<u8>>>(3)?.map(SceneData::new),
        state: parse_enum(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
    })
}

fn scene_param(data: Option<&SceneData>) -> libsql::Value {
    data.map_or(libsql::Value::Null, |d| {
        libsql::Value::Blob(d.as_bytes().to_vec())
    })
}

/// What a project deletion removed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProjectCascade {
    /// The project row, now in the `deleted` state.
    pub project: Project,
    pub assets_removed: u64,
    pub objects_removed: u64,
    pub links_removed: u64,
    /// Storage keys of the removed assets. Their blobs are left in place.
    pub orphaned_keys: Vec<String>,
}

async fn fetch_active(conn: &libsql::Connection, id: i64) -> Result<Project, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1 AND state = 'active'"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("project", id))?;
    row_to_project(&row)
}

async fn cascade_delete(
    conn: &libsql::Connection,
    id: i64,
    now: DateTime<Utc>,
) -> Result<ProjectCascade, DatabaseError> {
    let project = fetch_active(conn, id).await?;

    let mut orphaned_keys = Vec::new();
    let mut rows = conn
        .query(
            "SELECT storage_key FROM assets WHERE project_id = ?1 ORDER BY id",
            [id],
        )
        .await?;
    while let Some(row) = rows.next().await? {
        orphaned_keys.push(row.get::<String>(0)?);
    }

    let objects_removed = conn
        .execute("DELETE FROM objects WHERE project_id = ?1", [id])
        .await?;
    let links_removed = conn
        .execute("DELETE FROM shared_links WHERE project_id = ?1", [id])
        .await?;
    let assets_removed = conn
        .execute("DELETE FROM assets WHERE project_id = ?1", [id])
        .await?;

    let stamp = fmt_datetime(now);
    let updated = conn
        .execute(
            "UPDATE projects SET state = ?1, deleted_at = ?2, updated_at = ?2
             WHERE id = ?3 AND state = 'active'",
            libsql::params![ProjectState::Deleted.as_str(), stamp.as_str(), id],
        )
        .await?;
    if updated != 1 {
        return Err(DatabaseError::InvalidState(format!(
            "project {id} changed state during deletion"
        )));
    }

    Ok(ProjectCascade {
        project: Project {
            state: ProjectState::Deleted,
            updated_at: now,
            deleted_at: Some(now),
            ..project
        },
        assets_removed,
        objects_removed,
        links_removed,
        orphaned_keys,
    })
}

impl MetadataStore {
    pub async fn create_project(
        &self,
        title: &str,
        frame_size: FrameSize,
        project_data: Option<&SceneData>,
    ) -> Result<Project, DatabaseError> {
        let now = now();
        let stamp = fmt_datetime(now);

        let _guard = self.write_lock().await;
        self.conn()
            .execute(
                "INSERT INTO projects (title, frame_size, project_data, state, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                libsql::params![
                    title,
                    frame_size.as_str(),
                    scene_param(project_data),
                    ProjectState::Active.as_str(),
                    stamp.as_str()
                ],
            )
            .await?;
        let id = self.conn().last_insert_rowid();

        Ok(Project {
            id,
            title: title.to_string(),
            frame_size,
            project_data: project_data.cloned(),
            state: ProjectState::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Fetch an active project. Deleted projects are reported as `NotFound`.
    pub async fn get_project(&self, id: i64) -> Result<Project, DatabaseError> {
        let _guard = self.read_lock().await;
        fetch_active(self.conn(), id).await
    }

    pub async fn update_project(
        &self,
        id: i64,
        update: ProjectUpdate,
    ) -> Result<Project, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref title) = update.title {
            sets.push(format!("title = ?{idx}"));
            params.push(title.clone().into());
            idx += 1;
        }
        if let Some(frame_size) = update.frame_size {
            sets.push(format!("frame_size = ?{idx}"));
            params.push(frame_size.as_str().into());
            idx += 1;
        }
        if let Some(ref project_data) = update.project_data {
            sets.push(format!("project_data = ?{idx}"));
            params.push(scene_param(project_data.as_ref()));
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_project(id).await;
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(fmt_datetime(now()).into());
        idx += 1;

        params.push(id.into());
        let sql = format!(
            "UPDATE projects SET {} WHERE id = ?{idx} AND state = 'active'",
            sets.join(", ")
        );

        let _guard = self.write_lock().await;
        let changed = self
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("project", id));
        }
        fetch_active(self.conn(), id).await
    }

    /// List active projects, newest first.
    pub async fn list_projects(&self, request: PageRequest) -> Result<Page<Project>, DatabaseError> {
        let _guard = self.read_lock().await;
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM projects WHERE state = 'active'", ())
            .await?;
        let total = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };

        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM projects WHERE state = 'active'
                     ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
                ),
                libsql::params![request.limit, request.offset()],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_project(&row)?);
        }
        Ok(Page {
            items,
            total,
            request,
        })
    }

    /// Soft-delete a project and hard-delete everything it owns.
    ///
    /// Runs in one transaction: either the project is marked deleted and all of
    /// its assets, objects, and shared links are gone, or nothing changes.
    pub async fn delete_project(&self, id: i64) -> Result<ProjectCascade, DatabaseError> {
        let _guard = self.write_lock().await;
        let tx = self.conn().transaction().await?;
        let result = cascade_delete(&tx, id, now()).await;
        finish_transaction(tx, result).await
    }
}
