use anyhow::bail;
use lerni_core::entities::{Answer, Question};
use lerni_db::updates::question::NewQuestion;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::NewArgs;
use crate::commands::shared::fields::answer_fields;
use crate::context::AppContext;
use crate::editor;
use crate::output::output;
use crate::ui;

#[derive(Debug, Serialize)]
struct CreateResponse {
    question: Question,
    answer: Answer,
}

/// Handle `study new`.
///
/// A prompt plus at least one inline field skips the editor.
pub async fn run(args: &NewArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let inline = answer_fields(&args.fields);
    let (prompt, fields) = match args.prompt.as_deref() {
        Some(prompt) if !inline.is_empty() => (prompt.to_string(), inline),
        given => {
            let text = editor::template(
                "New question. Fill in [prompt] and at least [raw_notes].",
                Some(given.unwrap_or_default()),
                &inline,
            );
            let draft = editor::edit(&ctx.config, &text)?;
            (draft.prompt.unwrap_or_default(), draft.fields)
        }
    };
    if prompt.trim().is_empty() {
        bail!("question prompt is empty; nothing saved");
    }

    let concept_id = match args.concept.as_deref() {
        Some(reference) => Some(ctx.service.find_concept(reference).await?.id),
        None => None,
    };
    let new = NewQuestion {
        prompt,
        concept_id,
        difficulty: args.difficulty,
        answer: fields,
        source_refs: args.sources.clone(),
    };

    let (question, answer) = ctx.write(|| ctx.service.create_question(&new)).await?;
    ui::note(&format!(
        "Created {}. First review: study review start {}",
        question.id, question.id
    ));
    output(&CreateResponse { question, answer }, flags.format)
}
