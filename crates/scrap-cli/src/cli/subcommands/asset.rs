use std::path::PathBuf;

use clap::Subcommand;

/// Asset commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AssetCommands {
    /// List the assets of a project.
    List { project_id: i64 },
    /// Upload a PNG to a project.
    Upload {
        project_id: i64,
        file: PathBuf,
        /// Declared content type (defaults to none)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete an asset and, best effort, its blob.
    Delete { id: i64 },
    /// Fetch an asset by its URL path or storage key.
    Serve {
        path: String,
        /// Write the bytes here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remove blobs that no asset references.
    Reconcile {
        /// Limit the pass to one project
        #[arg(long)]
        project: Option<i64>,
    },
}
