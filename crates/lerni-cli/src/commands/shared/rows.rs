use lerni_core::entities::Question;
use lerni_core::sm2::format_interval;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::output::output;

/// One line of a question list in table mode.
#[derive(Debug, Serialize)]
pub struct QuestionRow<'a> {
    pub id: &'a str,
    pub prompt: &'a str,
    pub concept_id: Option<&'a str>,
    pub next_review: String,
    pub interval: String,
    pub difficulty: Option<u8>,
}

#[must_use]
pub fn question_rows(questions: &[Question]) -> Vec<QuestionRow<'_>> {
    questions
        .iter()
        .map(|q| QuestionRow {
            id: &q.id,
            prompt: &q.prompt,
            concept_id: q.concept_id.as_deref(),
            next_review: q
                .schedule_state
                .next_review_at
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            interval: format_interval(q.schedule_state.interval),
            difficulty: q.difficulty,
        })
        .collect()
}

/// Full questions for json/raw, compact rows for tables.
pub fn output_questions(questions: &[Question], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => output(&question_rows(questions), format),
        OutputFormat::Json | OutputFormat::Raw => output(&questions, format),
    }
}
