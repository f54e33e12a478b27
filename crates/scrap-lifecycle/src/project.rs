//! Project lifecycle: validated CRUD, paginated listing, cascading delete, and
//! scene object management.

use std::sync::Arc;

use scrap_core::entities::{Project, ProjectDetail, SceneData, SceneObject};
use scrap_core::enums::FrameSize;
use scrap_core::pagination::{Page, PageRequest};
use scrap_db::updates::object::ObjectUpdate;
use scrap_db::updates::project::ProjectUpdate;
use scrap_db::{MetadataStore, NewObject, ProjectCascade};

use crate::error::{LifecycleError, ValidationError};

/// Trim a title and reject it if nothing is left.
///
/// # Errors
///
/// Returns `ValidationError::EmptyTitle` for blank titles.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Parse a caller-supplied frame size.
///
/// # Errors
///
/// Returns `ValidationError::InvalidFrameSize` for anything but `20x20`/`20x30`.
pub fn parse_frame_size(raw: &str) -> Result<FrameSize, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::InvalidFrameSize(raw.trim().to_string()))
}

const fn validate_layers(layers: i64) -> Result<i64, ValidationError> {
    if layers < 1 {
        return Err(ValidationError::InvalidLayer(layers));
    }
    Ok(layers)
}

/// Field-level changes to a project, as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub frame_size: Option<String>,
    /// `Some(None)` clears the scene data.
    pub project_data: Option<Option<SceneData>>,
}

impl ProjectChanges {
    fn validate(self) -> Result<ProjectUpdate, ValidationError> {
        Ok(ProjectUpdate {
            title: self.title.as_deref().map(validate_title).transpose()?,
            frame_size: self.frame_size.as_deref().map(parse_frame_size).transpose()?,
            project_data: self.project_data,
        })
    }
}

/// A scene object to add to a project.
#[derive(Debug, Clone)]
pub struct ObjectDraft {
    pub asset_id: Option<i64>,
    pub position: serde_json::Value,
    /// Defaults to 1.
    pub layers: Option<i64>,
    pub properties: Option<serde_json::Value>,
}

impl ObjectDraft {
    #[must_use]
    pub const fn at(position: serde_json::Value) -> Self {
        Self {
            asset_id: None,
            position,
            layers: None,
            properties: None,
        }
    }
}

#[derive(Clone)]
pub struct ProjectManager {
    store: Arc<MetadataStore>,
}

impl ProjectManager {
    pub const fn new(store: Arc<MetadataStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        title: &str,
        frame_size: &str,
        project_data: Option<SceneData>,
    ) -> Result<Project, LifecycleError> {
        let title = validate_title(title)?;
        let frame_size = parse_frame_size(frame_size)?;
        let project = self
            .store
            .create_project(&title, frame_size, project_data.as_ref())
            .await?;
        tracing::info!(project_id = project.id, frame_size = %frame_size, "project created");
        Ok(project)
    }

    /// A project with its assets and objects.
    pub async fn get(&self, project_id: i64) -> Result<ProjectDetail, LifecycleError> {
        let project = self.store.get_project(project_id).await?;
        let assets = self.store.list_assets(project_id).await?;
        let objects = self.store.list_objects(project_id).await?;
        Ok(ProjectDetail {
            project,
            assets,
            objects,
        })
    }

    /// Apply field-level changes. Concurrent updates are last-writer-wins.
    pub async fn update(
        &self,
        project_id: i64,
        changes: ProjectChanges,
    ) -> Result<Project, LifecycleError> {
        let update = changes.validate()?;
        let project = self.store.update_project(project_id, update).await?;
        tracing::info!(project_id, "project updated");
        Ok(project)
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<Project>, LifecycleError> {
        Ok(self.store.list_projects(request).await?)
    }

    /// Delete a project and, atomically, all of its assets, objects, and
    /// shared links. Blobs are not touched; [`crate::AssetManager::reconcile`]
    /// reclaims them.
    pub async fn delete(&self, project_id: i64) -> Result<ProjectCascade, LifecycleError> {
        let cascade = self.store.delete_project(project_id).await?;
        tracing::info!(
            project_id,
            assets = cascade.assets_removed,
            objects = cascade.objects_removed,
            links = cascade.links_removed,
            orphaned_blobs = cascade.orphaned_keys.len(),
            "project deleted"
        );
        Ok(cascade)
    }

    /// Check that `asset_id` exists and belongs to `project_id`.
    async fn check_asset(&self, project_id: i64, asset_id: i64) -> Result<(), LifecycleError> {
        let asset = self.store.get_asset(asset_id).await?;
        if asset.project_id != project_id {
            return Err(ValidationError::AssetProjectMismatch {
                asset_id,
                asset_project_id: asset.project_id,
                project_id,
            }
            .into());
        }
        Ok(())
    }

    pub async fn add_object(
        &self,
        project_id: i64,
        draft: ObjectDraft,
    ) -> Result<SceneObject, LifecycleError> {
        let layers = validate_layers(draft.layers.unwrap_or(1))?;
        self.store.get_project(project_id).await?;
        if let Some(asset_id) = draft.asset_id {
            self.check_asset(project_id, asset_id).await?;
        }

        let object = self
            .store
            .insert_object(&NewObject {
                project_id,
                asset_id: draft.asset_id,
                position: draft.position,
                layers,
                properties: draft.properties,
            })
            .await?;
        tracing::debug!(project_id, object_id = object.id, "object added");
        Ok(object)
    }

    pub async fn update_object(
        &self,
        object_id: i64,
        update: ObjectUpdate,
    ) -> Result<SceneObject, LifecycleError> {
        if let Some(layers) = update.layers {
            validate_layers(layers)?;
        }
        let current = self.store.get_object(object_id).await?;
        self.store.get_project(current.project_id).await?;
        if let Some(Some(asset_id)) = update.asset_id {
            self.check_asset(current.project_id, asset_id).await?;
        }

        Ok(self.store.update_object(object_id, &update).await?)
    }

    pub async fn remove_object(&self, object_id: i64) -> Result<SceneObject, LifecycleError> {
        let object = self.store.delete_object(object_id).await?;
        tracing::debug!(project_id = object.project_id, object_id, "object removed");
        Ok(object)
    }

    /// Objects of a project, newest first.
    pub async fn list_objects(&self, project_id: i64) -> Result<Vec<SceneObject>, LifecycleError> {
        self.store.get_project(project_id).await?;
        Ok(self.store.list_objects(project_id).await?)
    }
}
