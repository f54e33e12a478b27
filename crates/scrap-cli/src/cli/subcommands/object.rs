use clap::Subcommand;

/// Scene object commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ObjectCommands {
    /// Add an object to a project.
    Add {
        project_id: i64,
        /// Position as inline JSON, e.g. {"x":0,"y":0,"z":0}
        #[arg(long)]
        position: String,
        #[arg(long)]
        asset: Option<i64>,
        #[arg(long)]
        layers: Option<i64>,
        /// Properties as inline JSON
        #[arg(long)]
        properties: Option<String>,
    },
    /// Update object fields.
    Update {
        id: i64,
        #[arg(long)]
        position: Option<String>,
        #[arg(long, conflicts_with = "clear_asset")]
        asset: Option<i64>,
        #[arg(long)]
        clear_asset: bool,
        #[arg(long)]
        layers: Option<i64>,
        #[arg(long, conflicts_with = "clear_properties")]
        properties: Option<String>,
        #[arg(long)]
        clear_properties: bool,
    },
    /// Remove an object.
    Remove { id: i64 },
    /// List the objects of a project.
    List { project_id: i64 },
}
