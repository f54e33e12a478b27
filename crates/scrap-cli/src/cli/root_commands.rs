use clap::Subcommand;

use super::subcommands::{AssetCommands, LinkCommands, ObjectCommands, ProjectCommands};

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Manage scene objects inside a project.
    Object {
        #[command(subcommand)]
        action: ObjectCommands,
    },
    /// Upload, serve, and clean up photo assets.
    Asset {
        #[command(subcommand)]
        action: AssetCommands,
    },
    /// Issue and resolve shared links.
    Link {
        #[command(subcommand)]
        action: LinkCommands,
    },
    /// Report the health of both stores.
    Health,
}
