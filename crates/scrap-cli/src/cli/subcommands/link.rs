use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Shared link commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LinkCommands {
    /// Issue a share token for a project.
    Create {
        project_id: i64,
        #[arg(long, conflicts_with = "expires_at")]
        expires_in_hours: Option<i64>,
        /// RFC 3339 timestamp
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,
    },
    /// List the links of a project.
    List { project_id: i64 },
    /// Revoke a link.
    Revoke { token: String },
    /// Show what a token grants access to.
    Resolve { token: String },
    /// Delete expired links.
    Sweep {
        /// Keep sweeping on the configured interval until interrupted
        #[arg(long)]
        watch: bool,
    },
}
