use clap::Subcommand;

/// Project commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// List active projects, newest first.
    List {
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Create a project.
    Create {
        #[arg(long)]
        title: String,
        /// 20x20 or 20x30
        #[arg(long)]
        frame_size: String,
        /// Scene data as inline JSON
        #[arg(long)]
        data: Option<String>,
    },
    /// Get a project with its assets and objects.
    Get { id: i64 },
    /// Update project fields.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        frame_size: Option<String>,
        #[arg(long, conflicts_with = "clear_data")]
        data: Option<String>,
        #[arg(long)]
        clear_data: bool,
    },
    /// Delete a project and everything it owns.
    Delete {
        id: i64,
        /// Leave the asset blobs for a later reconcile pass
        #[arg(long)]
        keep_blobs: bool,
    },
}
