//! Answer repository: versioned snapshots and in-place fixes.
//!
//! A question always points at exactly one current answer. `snapshot` adds a
//! new version and moves the pointer; older versions are never rewritten.
//! `edit` rewrites the current version in place, unless a review already
//! captured it, in which case the edit becomes a new version.

use lerni_core::entities::{Answer, AnswerFields};
use lerni_core::ids::PREFIX_ANSWER;
use lerni_core::responses::EditOutcome;
use tracing::debug;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, get_opt_string, parse_datetime, query_count};
use crate::repos::question::require_question;
use crate::service::LerniService;
use crate::{finish, generate_id};

const ANSWER_COLS: &str = "id, question_id, raw_notes, simple_explanation, gaps_questions, \
     final_explanation, analogies_examples, created_at";

fn row_to_answer(row: &libsql::Row) -> Result<Answer, DatabaseError> {
    Ok(Answer {
        id: row.get(0)?,
        question_id: row.get(1)?,
        raw_notes: row.get(2)?,
        simple_explanation: get_opt_string(row, 3)?,
        gaps_questions: get_opt_string(row, 4)?,
        final_explanation: get_opt_string(row, 5)?,
        analogies_examples: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

pub(crate) async fn require_answer(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Answer, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {ANSWER_COLS} FROM answers WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("answer", id))?;
    row_to_answer(&row)
}

pub(crate) async fn insert_answer(
    conn: &libsql::Connection,
    answer: &Answer,
) -> Result<(), DatabaseError> {
    conn.execute(
        &format!("INSERT INTO answers ({ANSWER_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        libsql::params![
            answer.id.as_str(),
            answer.question_id.as_str(),
            answer.raw_notes.as_str(),
            answer.simple_explanation.as_deref(),
            answer.gaps_questions.as_deref(),
            answer.final_explanation.as_deref(),
            answer.analogies_examples.as_deref(),
            fmt_datetime(answer.created_at)
        ],
    )
    .await?;
    Ok(())
}

/// Insert `content` as a new version and point the question at it.
async fn add_version(
    conn: &libsql::Connection,
    content: &Answer,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Answer, DatabaseError> {
    let answer = Answer {
        id: generate_id(conn, PREFIX_ANSWER).await?,
        created_at: now,
        ..content.clone()
    };
    insert_answer(conn, &answer).await?;
    conn.execute(
        "UPDATE questions SET current_answer_id = ?1, updated_at = ?2 WHERE id = ?3",
        libsql::params![
            answer.id.as_str(),
            fmt_datetime(now),
            answer.question_id.as_str()
        ],
    )
    .await?;
    Ok(answer)
}

impl LerniService {
    pub async fn get_answer(&self, id: &str) -> Result<Answer, DatabaseError> {
        require_answer(self.db().conn(), id).await
    }

    pub async fn current_answer(&self, question_id: &str) -> Result<Answer, DatabaseError> {
        let conn = self.db().conn();
        let question = require_question(conn, question_id).await?;
        require_answer(conn, &question.current_answer_id).await
    }

    /// Every answer version of a question, oldest first.
    pub async fn history(&self, question_id: &str) -> Result<Vec<Answer>, DatabaseError> {
        let conn = self.db().conn();
        require_question(conn, question_id).await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {ANSWER_COLS} FROM answers
                     WHERE question_id = ?1
                     ORDER BY created_at, rowid"
                ),
                [question_id],
            )
            .await?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next().await? {
            answers.push(row_to_answer(&row)?);
        }
        Ok(answers)
    }

    /// Record a new answer version. Fields not given are copied from the
    /// current version.
    pub async fn snapshot(
        &self,
        question_id: &str,
        fields: &AnswerFields,
    ) -> Result<Answer, DatabaseError> {
        let now = self.now();
        let tx = self.db().begin().await?;
        let result: Result<Answer, DatabaseError> = async {
            let question = require_question(&tx, question_id).await?;
            let current = require_answer(&tx, &question.current_answer_id).await?;
            add_version(&tx, &fields.apply_to(&current), now).await
        }
        .await;
        let answer = finish(tx, result).await?;
        debug!(question_id, answer_id = %answer.id, "snapshotted answer");
        Ok(answer)
    }

    /// Fix the current answer in place.
    ///
    /// If any review references the current answer, the change is written as
    /// a new version instead and `forked` is set.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `fields` changes nothing.
    pub async fn edit(
        &self,
        question_id: &str,
        fields: &AnswerFields,
    ) -> Result<EditOutcome, DatabaseError> {
        if fields.is_empty() {
            return Err(DatabaseError::validation("No answer fields to edit"));
        }
        let now = self.now();

        let tx = self.db().begin().await?;
        let result: Result<EditOutcome, DatabaseError> = async {
            let question = require_question(&tx, question_id).await?;
            let current = require_answer(&tx, &question.current_answer_id).await?;
            let merged = fields.apply_to(&current);

            let reviewed = query_count(
                &tx,
                "SELECT COUNT(*) FROM reviews WHERE answer_id = ?1",
                [current.id.as_str()],
            )
            .await?;
            if reviewed > 0 {
                let answer = add_version(&tx, &merged, now).await?;
                return Ok(EditOutcome {
                    answer,
                    forked: true,
                });
            }

            tx.execute(
                "UPDATE answers
                 SET raw_notes = ?1, simple_explanation = ?2, gaps_questions = ?3,
                     final_explanation = ?4, analogies_examples = ?5
                 WHERE id = ?6",
                libsql::params![
                    merged.raw_notes.as_str(),
                    merged.simple_explanation.as_deref(),
                    merged.gaps_questions.as_deref(),
                    merged.final_explanation.as_deref(),
                    merged.analogies_examples.as_deref(),
                    merged.id.as_str()
                ],
            )
            .await?;
            tx.execute(
                "UPDATE questions SET updated_at = ?1 WHERE id = ?2",
                libsql::params![fmt_datetime(now), question_id],
            )
            .await?;
            Ok(EditOutcome {
                answer: merged,
                forked: false,
            })
        }
        .await;
        let outcome = finish(tx, result).await?;
        debug!(
            question_id,
            answer_id = %outcome.answer.id,
            forked = outcome.forked,
            "edited answer"
        );
        Ok(outcome)
    }
}
