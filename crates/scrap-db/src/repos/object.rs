//! Scene object repository.

use scrap_core::entities::SceneObject;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_opt_string, json_param, now, opt_i64_param, parse_datetime, parse_json,
    parse_optional_json,
};
use crate::store::MetadataStore;
use crate::updates::object::ObjectUpdate;

const SELECT_COLS: &str = "id, project_id, asset_id, position, layers, properties, created_at";

fn row_to_object(row: &libsql::Row) -> Result<SceneObject, DatabaseError> {
    Ok(SceneObject {
        id: row.get(0)?,
        project_id: row.get(1)?,
        asset_id: row.get::<Option<i64>>(2)?,
        position: parse_json(&row.get::<String>(3)?)?,
        layers: row.get(4)?,
        properties: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

async fn fetch_object(conn: &libsql::Connection, id: i64) -> Result<SceneObject, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM objects WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("object", id))?;
    row_to_object(&row)
}

/// Fields of a scene object about to be inserted.
#[derive(Debug, Clone)]
pub struct NewObject {
    pub project_id: i64,
    pub asset_id: Option<i64>,
    pub position: serde_json::Value,
    pub layers: i64,
    pub properties: Option<serde_json::Value>,
}

impl MetadataStore {
    /// Insert a scene object. The owning project must exist and be active.
    pub async fn insert_object(&self, new: &NewObject) -> Result<SceneObject, DatabaseError> {
        let now = now();

        let _guard = self.write_lock().await;
        let inserted = self
            .conn()
            .execute(
                "INSERT INTO objects (project_id, asset_id, position, layers, properties, created_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6 FROM projects WHERE id = ?1 AND state = 'active'",
                libsql::params![
                    new.project_id,
                    opt_i64_param(new.asset_id),
                    new.position.to_string(),
                    new.layers,
                    json_param(new.properties.as_ref()),
                    fmt_datetime(now)
                ],
            )
            .await?;
        if inserted == 0 {
            return Err(DatabaseError::not_found("project", new.project_id));
        }
        let id = self.conn().last_insert_rowid();

        Ok(SceneObject {
            id,
            project_id: new.project_id,
            asset_id: new.asset_id,
            position: new.position.clone(),
            layers: new.layers,
            properties: new.properties.clone(),
            created_at: now,
        })
    }

    pub async fn get_object(&self, id: i64) -> Result<SceneObject, DatabaseError> {
        let _guard = self.read_lock().await;
        fetch_object(self.conn(), id).await
    }

    pub async fn update_object(
        &self,
        id: i64,
        update: &ObjectUpdate,
    ) -> Result<SceneObject, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(asset_id) = update.asset_id {
            sets.push(format!("asset_id = ?{idx}"));
            params.push(opt_i64_param(asset_id));
            idx += 1;
        }
        if let Some(ref position) = update.position {
            sets.push(format!("position = ?{idx}"));
            params.push(position.to_string().into());
            idx += 1;
        }
        if let Some(layers) = update.layers {
            sets.push(format!("layers = ?{idx}"));
            params.push(layers.into());
            idx += 1;
        }
        if let Some(ref properties) = update.properties {
            sets.push(format!("properties = ?{idx}"));
            params.push(json_param(properties.as_ref()));
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_object(id).await;
        }

        params.push(id.into());
        let sql = format!("UPDATE objects SET {} WHERE id = ?{idx}", sets.join(", "));

        let _guard = self.write_lock().await;
        let changed = self
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("object", id));
        }
        fetch_object(self.conn(), id).await
    }

    pub async fn delete_object(&self, id: i64) -> Result<SceneObject, DatabaseError> {
        let _guard = self.write_lock().await;
        let object = fetch_object(self.conn(), id).await?;
        self.conn()
            .execute("DELETE FROM objects WHERE id = ?1", [id])
            .await?;
        Ok(object)
    }

    /// Objects of a project, newest first.
    pub async fn list_objects(&self, project_id: i64) -> Result<Vec<SceneObject>, DatabaseError> {
        let _guard = self.read_lock().await;
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM objects WHERE project_id = ?1
                     ORDER BY created_at DESC, id DESC"
                ),
                [project_id],
            )
            .await?;

        let mut objects = Vec::new();
        while let Some(row) = rows.next().await? {
            objects.push(row_to_object(&row)?);
        }
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::test_support::helpers::{new_asset, new_object, seed_project, test_store};
    use crate::updates::object::ObjectUpdateBuilder;

    use super::*;

    #[tokio::test]
    async fn insert_defaults_and_roundtrip() {
        let store = test_store().await;
        let p = seed_project(&store, "p").await;
        let created = store.insert_object(&new_object(p.id, None)).await.unwrap();
        assert_eq!(created.layers, 1);

        let fetched = store.get_object(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.position, json!({"x": 0, "y": 0, "z": 0}));
    }

    #[tokio::test]
    async fn zero_layers_violates_constraint() {
        let store = test_store().await;
        let p = seed_project(&store, "p").await;
        let mut new = new_object(p.id, None);
        new.layers = 0;
        assert!(store.insert_object(&new).await.unwrap_err().is_constraint());
    }

    #[tokio::test]
    async fn unknown_asset_reference_violates_constraint() {
        let store = test_store().await;
        let p = seed_project(&store, "p").await;
        let err = store.insert_object(&new_object(p.id, Some(404))).await.unwrap_err();
        assert!(err.is_constraint(), "got {err:?}");
    }

    #[tokio::test]
    async fn update_patches_fields() {
        let store = test_store().await;
        let p = seed_project(&store, "p").await;
        let asset = store
            .insert_asset(&new_asset(p.id, "projects/1/assets/o.png"))
            .await
            .unwrap();
        let created = store.insert_object(&new_object(p.id, None)).await.unwrap();

        let update = ObjectUpdateBuilder::new()
            .asset_id(Some(asset.id))
            .layers(3)
            .properties(Some(json!({"rotation": 45})))
            .build();
        let updated = store.update_object(created.id, &update).await.unwrap();
        assert_eq!(updated.asset_id, Some(asset.id));
        assert_eq!(updated.layers, 3);
        assert_eq!(updated.properties, Some(json!({"rotation": 45})));
        assert_eq!(updated.position, created.position);

        let detached = store
            .update_object(created.id, &ObjectUpdateBuilder::new().asset_id(None).build())
            .await
            .unwrap();
        assert_eq!(detached.asset_id, None);
    }

    #[tokio::test]
    async fn delete_and_list() {
        let store = test_store().await;
        let p = seed_project(&store, "p").await;
        let a = store.insert_object(&new_object(p.id, None)).await.unwrap();
        let b = store.insert_object(&new_object(p.id, None)).await.unwrap();

        let ids: Vec<_> = store
            .list_objects(p.id)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);

        store.delete_object(a.id).await.unwrap();
        assert_eq!(store.list_objects(p.id).await.unwrap().len(), 1);
        assert!(store.delete_object(a.id).await.unwrap_err().is_not_found());
    }
}
