use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => commands::auth::handle(&action, ctx, flags).await,
        Commands::Goal { action } => commands::goal::handle(&action, ctx, flags).await,
        Commands::Exam { action } => commands::exam::handle(&action, ctx, flags).await,
        Commands::Question { action } => commands::question::handle(&action, ctx, flags).await,
        Commands::Ai { action } => commands::ai::handle(&action, ctx, flags).await,
        Commands::Upload(args) => commands::upload::handle(&args, ctx, flags).await,
        Commands::Page(args) => commands::page::handle(&args, ctx, flags).await,
    }
}
