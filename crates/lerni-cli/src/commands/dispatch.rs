use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands::{concept, notify, question, review, today};
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::New(args) => question::create::run(&args, ctx, flags).await,
        Commands::Edit(args) => question::answer::edit(&args, ctx, flags).await,
        Commands::Snapshot(args) => question::answer::snapshot(&args, ctx, flags).await,
        Commands::Show { id } => question::show::run(&id, ctx, flags).await,
        Commands::History { id } => question::show::history(&id, ctx, flags).await,
        Commands::Delete { id, yes } => question::delete::run(&id, yes, ctx, flags).await,
        Commands::Assign(args) => question::assign::run(&args, ctx, flags).await,
        Commands::Meta(args) => question::meta::run(&args, ctx, flags).await,
        Commands::List(args) => question::list::run(&args, ctx, flags).await,
        Commands::Search(args) => question::list::search(&args.query, ctx, flags).await,
        Commands::Today => today::handle(ctx, flags).await,
        Commands::Review { action } => review::handle(&action, ctx, flags).await,
        Commands::Concept { action } => concept::handle(&action, ctx, flags).await,
        Commands::Notify(args) => {
            if args.setup {
                notify::setup(&ctx.config)
            } else {
                notify::handle(ctx).await
            }
        }
    }
}
