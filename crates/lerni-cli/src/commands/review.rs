use anyhow::bail;
use lerni_core::entities::Review;
use serde::Serialize;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::cli::subcommands::ReviewCommands;
use crate::context::AppContext;
use crate::editor;
use crate::output::output;
use crate::ui;

#[derive(Debug, Serialize)]
struct ReviewRow<'a> {
    id: &'a str,
    stage: &'static str,
    grade: Option<u8>,
    scheduled_for: String,
    completed_at: Option<String>,
}

/// Handle `study review`.
pub async fn handle(
    action: &ReviewCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ReviewCommands::Start {
            question_id,
            concept,
        } => start(question_id.as_deref(), concept.as_deref(), ctx, flags).await,
        ReviewCommands::Recall {
            review_id,
            explanation,
        } => recall(review_id, explanation.as_deref(), ctx, flags).await,
        ReviewCommands::Forget {
            review_id,
            explanation,
            gaps,
        } => {
            let revealed = ctx
                .write(|| {
                    ctx.service
                        .forget(review_id, explanation.as_deref(), gaps.as_deref())
                })
                .await?;
            ui::note(&format!(
                "Compare with the answer below, then: study review grade {review_id} <0-2>"
            ));
            output(&revealed, flags.format)
        }
        ReviewCommands::Grade {
            review_id,
            grade,
            notes,
        } => {
            let graded = ctx
                .write(|| ctx.service.grade(review_id, *grade, notes.as_deref()))
                .await?;
            ui::note(&format!(
                "{}. Next review in {}.",
                graded.grade_description, graded.interval_label
            ));
            output(&graded, flags.format)
        }
        ReviewCommands::Skip { question_id } => {
            let skipped = ctx.write(|| ctx.service.skip(question_id)).await?;
            output(&skipped, flags.format)
        }
        ReviewCommands::Show { review_id } => {
            let review = ctx.service.get_review(review_id).await?;
            output(&review, flags.format)
        }
        ReviewCommands::List { question_id } => {
            let reviews = ctx.service.reviews_for(question_id).await?;
            match flags.format {
                OutputFormat::Table => output(&review_rows(&reviews), flags.format),
                OutputFormat::Json | OutputFormat::Raw => output(&reviews, flags.format),
            }
        }
    }
}

/// With no question id, starts the next due question, optionally under `concept`.
async fn start(
    question_id: Option<&str>,
    concept: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let session = if let Some(question_id) = question_id {
        ctx.write(|| ctx.service.start_review(question_id)).await?
    } else {
        let subtree = match concept {
            Some(reference) => Some(ctx.service.find_concept(reference).await?.id),
            None => None,
        };
        let next = ctx
            .write(|| ctx.service.start_next_due(subtree.as_deref()))
            .await?;
        let Some(session) = next else {
            ui::note("Nothing due.");
            return Ok(());
        };
        session
    };
    if session.resumed {
        ui::note(&format!("Resuming pending review {}.", session.review.id));
    }
    ui::note(&format!(
        "Explain it from memory, then: study review recall {id}  (or: study review forget {id})",
        id = session.review.id
    ));
    output(&session, flags.format)
}

/// Without `--explanation` the attempt is written in the editor.
async fn recall(
    review_id: &str,
    explanation: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let attempt = match explanation {
        Some(text) => text.to_string(),
        None => {
            let review = ctx.service.get_review(review_id).await?;
            let question = ctx.service.get_question(&review.question_id).await?;
            editor::capture(
                &ctx.config,
                &format!("Explain from memory:\n{}", question.prompt),
            )?
        }
    };
    if attempt.trim().is_empty() {
        bail!("explanation is empty; use `study review forget {review_id}` if you could not recall");
    }

    let revealed = ctx.write(|| ctx.service.recall(review_id, &attempt)).await?;
    ui::note(&format!(
        "Compare with the answer below, then: study review grade {review_id} <3-5>"
    ));
    output(&revealed, flags.format)
}

fn review_rows(reviews: &[Review]) -> Vec<ReviewRow<'_>> {
    reviews
        .iter()
        .map(|review| ReviewRow {
            id: &review.id,
            stage: review.stage().as_str(),
            grade: review.self_grade,
            scheduled_for: review.scheduled_for.format("%Y-%m-%d %H:%M").to_string(),
            completed_at: review
                .completed_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
        })
        .collect()
}
