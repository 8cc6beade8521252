use lerni_core::entities::Answer;
use lerni_core::responses::QuestionDetail;
use serde::Serialize;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    version: usize,
    id: &'a str,
    created_at: String,
    current: bool,
    summary: &'a str,
}

/// Handle `study show`.
pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let detail: QuestionDetail = ctx.service.question_detail(id).await?;
    output(&detail, flags.format)
}

/// Handle `study history`.
pub async fn history(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let question = ctx.service.get_question(id).await?;
    let answers = ctx.service.history(id).await?;
    match flags.format {
        OutputFormat::Table => output(
            &history_rows(&answers, &question.current_answer_id),
            flags.format,
        ),
        OutputFormat::Json | OutputFormat::Raw => output(&answers, flags.format),
    }
}

fn history_rows<'a>(answers: &'a [Answer], current_id: &str) -> Vec<HistoryRow<'a>> {
    answers
        .iter()
        .enumerate()
        .map(|(index, answer)| HistoryRow {
            version: index + 1,
            id: &answer.id,
            created_at: answer.created_at.format("%Y-%m-%d %H:%M").to_string(),
            current: answer.id == current_id,
            summary: answer.best_explanation(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn answer(id: &str, notes: &str, final_explanation: Option<&str>) -> Answer {
        Answer {
            id: id.into(),
            question_id: "qst-1".into(),
            raw_notes: notes.into(),
            simple_explanation: None,
            gaps_questions: None,
            final_explanation: final_explanation.map(String::from),
            analogies_examples: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn rows_number_versions_and_mark_current() {
        let answers = vec![
            answer("ans-1", "first notes", None),
            answer("ans-2", "second notes", Some("polished")),
        ];
        let rows = history_rows(&answers, "ans-2");

        assert_eq!(rows[0].version, 1);
        assert!(!rows[0].current);
        assert_eq!(rows[0].summary, "first notes");
        assert_eq!(rows[1].version, 2);
        assert!(rows[1].current);
        assert_eq!(rows[1].summary, "polished");
        assert_eq!(rows[1].created_at, "2026-01-02 08:00");
    }
}
