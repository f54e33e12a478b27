use scrap_core::entities::SceneData;
use scrap_core::pagination::PageRequest;
use scrap_core::responses::PaginatedResponse;
use scrap_db::ProjectCascade;
use scrap_lifecycle::{LifecycleError, ProjectChanges, ReconcileReport};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProjectCommands;
use crate::context::AppContext;
use crate::output::{output, success};

#[derive(Debug, Serialize)]
struct ProjectDeleteResponse {
    #[serde(flatten)]
    cascade: ProjectCascade,
    /// Outcome of removing the project's blobs; absent with `--keep-blobs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    blobs: Option<ReconcileReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blob_error: Option<String>,
}

/// Handle `scrap project`.
pub async fn handle(
    action: &ProjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let projects = ctx.scrapbook.projects();
    match action {
        ProjectCommands::List { page, limit } => {
            let request = PageRequest::from_options(
                *page,
                Some(limit.unwrap_or(ctx.config.general.default_page_limit)),
            );
            let page = projects.list(request).await?;
            output(
                &PaginatedResponse::from_page("Projects fetched successfully", page),
                flags.format,
            )
        }
        ProjectCommands::Create {
            title,
            frame_size,
            data,
        } => {
            let data = data.as_deref().map(scene_data).transpose()?;
            let project = projects.create(title, frame_size, data).await?;
            success("Project created successfully", project, flags.format)
        }
        ProjectCommands::Get { id } => {
            let detail = projects.get(*id).await?;
            success("Project fetched successfully", detail, flags.format)
        }
        ProjectCommands::Update {
            id,
            title,
            frame_size,
            data,
            clear_data,
        } => {
            let project_data = if *clear_data {
                Some(None)
            } else {
                data.as_deref().map(scene_data).transpose()?.map(Some)
            };
            let changes = ProjectChanges {
                title: title.clone(),
                frame_size: frame_size.clone(),
                project_data,
            };
            let project = projects.update(*id, changes).await?;
            success("Project updated successfully", project, flags.format)
        }
        ProjectCommands::Delete { id, keep_blobs } => {
            let cascade = projects.delete(*id).await?;
            let (blobs, blob_error) = if *keep_blobs || cascade.orphaned_keys.is_empty() {
                (None, None)
            } else {
                match ctx.scrapbook.assets().purge(&cascade.orphaned_keys).await {
                    Ok(report) => (Some(report), None),
                    Err(e @ (LifecycleError::StorageUnavailable(_) | LifecycleError::Store(_))) => {
                        tracing::warn!(project_id = id, error = %e, "blob cleanup deferred to reconcile");
                        (None, Some(e.to_string()))
                    }
                    Err(e) => return Err(e.into()),
                }
            };
            success(
                "Project deleted successfully",
                ProjectDeleteResponse {
                    cascade,
                    blobs,
                    blob_error,
                },
                flags.format,
            )
        }
    }
}

/// Validate `--data` as JSON and keep the caller's text byte-for-byte.
fn scene_data(raw: &str) -> anyhow::Result<SceneData> {
    SceneData::from_json_str(raw).map_err(|e| anyhow::anyhow!("--data is not valid JSON: {e}"))
}
