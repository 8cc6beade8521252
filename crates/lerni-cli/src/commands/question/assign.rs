use crate::cli::GlobalFlags;
use crate::cli::root_commands::AssignArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `study assign`.
pub async fn run(args: &AssignArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let question = match args.concept.as_deref() {
        Some(reference) if !args.none => {
            let concept = ctx.service.find_concept(reference).await?;
            ctx.write(|| ctx.service.assign(&args.id, &concept.id)).await?
        }
        _ => ctx.write(|| ctx.service.unassign(&args.id)).await?,
    };
    output(&question, flags.format)
}
