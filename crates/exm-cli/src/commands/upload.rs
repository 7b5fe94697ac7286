use crate::cli::GlobalFlags;
use crate::cli::root_commands::UploadArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `exm upload`.
pub async fn handle(args: &UploadArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let uploaded = ctx.api.upload(&args.file).await?;
    output(&uploaded, flags.format)
}
