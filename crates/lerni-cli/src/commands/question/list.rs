use lerni_db::repos::question::QuestionFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ListArgs;
use crate::commands::shared::limit::{effective_limit, truncate};
use crate::commands::shared::rows::output_questions;
use crate::context::AppContext;

/// Handle `study list`.
pub async fn run(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
    let concept_id = match args.concept.as_deref() {
        Some(reference) => Some(ctx.service.find_concept(reference).await?.id),
        None => None,
    };

    let questions = if args.due {
        let mut due = ctx
            .service
            .due(ctx.service.now(), concept_id.as_deref())
            .await?;
        if args.uncategorized {
            due.retain(|question| question.concept_id.is_none());
        }
        truncate(&mut due, limit);
        due
    } else {
        ctx.service
            .list_questions(&QuestionFilter {
                concept_id,
                uncategorized: args.uncategorized,
                limit: Some(limit),
            })
            .await?
    };
    output_questions(&questions, flags.format)
}

/// Handle `study search`.
pub async fn search(query: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
    let questions = ctx.service.search_questions(query, limit).await?;
    output_questions(&questions, flags.format)
}
