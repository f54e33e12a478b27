use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Project { action } => commands::project::handle(&action, ctx, flags).await,
        Commands::Object { action } => commands::object::handle(&action, ctx, flags).await,
        Commands::Asset { action } => commands::asset::handle(&action, ctx, flags).await,
        Commands::Link { action } => commands::link::handle(&action, ctx, flags).await,
        Commands::Health => commands::health::handle(ctx, flags).await,
    }
}
