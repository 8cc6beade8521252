use anyhow::bail;
use lerni_core::entities::AnswerFields;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnswerArgs;
use crate::commands::shared::fields::answer_fields;
use crate::context::AppContext;
use crate::editor;
use crate::output::output;
use crate::ui;

/// Handle `study edit`: fix the current answer in place.
pub async fn edit(args: &AnswerArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(fields) = collect(args, ctx, "Editing").await? else {
        ui::note("No changes.");
        return Ok(());
    };

    let outcome = ctx.write(|| ctx.service.edit(&args.id, &fields)).await?;
    if outcome.forked {
        ui::note(&format!(
            "Answer was already reviewed; saved as new version {}.",
            outcome.answer.id
        ));
    }
    output(&outcome, flags.format)
}

/// Handle `study snapshot`: record a new answer version.
pub async fn snapshot(
    args: &AnswerArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let Some(fields) = collect(args, ctx, "New version of").await? else {
        ui::note("No changes.");
        return Ok(());
    };

    let answer = ctx.write(|| ctx.service.snapshot(&args.id, &fields)).await?;
    output(&answer, flags.format)
}

/// Inline flags, or the editor pre-filled with the current answer.
/// `None` when the editor result matches what is stored.
async fn collect(
    args: &AnswerArgs,
    ctx: &AppContext,
    verb: &str,
) -> anyhow::Result<Option<AnswerFields>> {
    if !args.fields.is_empty() {
        return Ok(Some(answer_fields(&args.fields)));
    }

    let question = ctx.service.get_question(&args.id).await?;
    let current = ctx.service.current_answer(&args.id).await?;
    let header = format!("{verb} {}: {}", question.id, question.prompt);
    let draft = editor::edit(
        &ctx.config,
        &editor::template(&header, None, &editor::content_of(&current)),
    )?;
    if draft.prompt.is_some() {
        bail!("the prompt cannot be changed here");
    }

    let fields = draft.fields;
    if fields.is_empty() || fields.apply_to(&current) == current {
        return Ok(None);
    }
    Ok(Some(fields))
}
