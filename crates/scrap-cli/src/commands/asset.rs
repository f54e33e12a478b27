use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use scrap_lifecycle::NewUpload;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AssetCommands;
use crate::context::AppContext;
use crate::output::success;

#[derive(Debug, Serialize)]
struct ServedFile {
    path: String,
    size: u64,
    content_type: String,
}

/// Handle `scrap asset`.
pub async fn handle(
    action: &AssetCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let assets = ctx.scrapbook.assets();
    match action {
        AssetCommands::List { project_id } => {
            let list = assets.list(*project_id).await?;
            success("Assets fetched successfully", list, flags.format)
        }
        AssetCommands::Upload {
            project_id,
            file,
            content_type,
        } => {
            let upload = read_upload(file, content_type.as_deref()).await?;
            let asset = assets.upload(*project_id, upload).await?;
            success("Asset uploaded successfully", asset, flags.format)
        }
        AssetCommands::Delete { id } => {
            let deleted = assets.delete(*id).await?;
            success("Asset deleted successfully", deleted, flags.format)
        }
        AssetCommands::Serve { path, out } => {
            let blob = assets.serve_path(path).await?;
            let content_type = blob.content_type.clone();
            let size = blob.size;
            let bytes = blob.into_bytes().await.context("failed to read asset blob")?;
            match out {
                Some(out) => {
                    tokio::fs::write(out, &bytes)
                        .await
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    success(
                        "Asset served successfully",
                        ServedFile {
                            path: out.display().to_string(),
                            size,
                            content_type,
                        },
                        flags.format,
                    )
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&bytes).await?;
                    stdout.flush().await?;
                    Ok(())
                }
            }
        }
        AssetCommands::Reconcile { project } => {
            let report = assets.reconcile(*project).await?;
            success("Reconciliation finished", report, flags.format)
        }
    }
}

async fn read_upload(file: &Path, content_type: Option<&str>) -> anyhow::Result<NewUpload> {
    let content = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", file.display()))?;

    let upload = NewUpload::new(filename, Bytes::from(content));
    Ok(match content_type {
        Some(declared) => upload.with_declared_type(declared),
        None => upload,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::read_upload;

    #[tokio::test]
    async fn upload_takes_name_and_bytes_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

        let upload = read_upload(&path, Some("image/png")).await.unwrap();
        assert_eq!(upload.filename, "photo.png");
        assert_eq!(upload.content.len(), 8);
        assert_eq!(upload.declared_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_upload(&dir.path().join("nope.png"), None).await.unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
