use exm_core::entities::NewGoal;
use exm_core::enums::GoalStatus;
use exm_core::paging::GoalFilter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::GoalCommands;
use crate::commands::shared::limit::pagination;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `exm goal`.
pub async fn handle(
    action: &GoalCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        GoalCommands::List {
            name,
            subject,
            status,
        } => {
            let filter = GoalFilter {
                name: name.clone(),
                subject: subject.clone(),
                status: parse_opt_enum(status.as_deref(), "status")?,
            };
            let goals = ctx.api.goals(&filter, &pagination(ctx, flags)).await?;
            output(&goals, flags.format)
        }
        GoalCommands::Get { id } => output(&ctx.api.goal(id).await?, flags.format),
        GoalCommands::Create {
            name,
            subject,
            status,
            prompt,
        } => {
            let goal = NewGoal {
                name: name.clone(),
                subject: subject.clone(),
                status: parse_opt_enum(status.as_deref(), "status")?
                    .unwrap_or(GoalStatus::Preparing),
                ai_prompt: prompt.clone().unwrap_or_default(),
            };
            output(&ctx.api.create_goal(&goal).await?, flags.format)
        }
        GoalCommands::Delete { id } => {
            ctx.api.delete_goal(id).await?;
            output(&serde_json::json!({ "deleted": id }), flags.format)
        }
    }
}
