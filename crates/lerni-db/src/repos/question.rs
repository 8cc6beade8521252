//! Question repository: creation, due queries, categorization, and metadata.

use chrono::{DateTime, Duration, Utc};
use lerni_core::entities::{Answer, Question, ScheduleState};
use lerni_core::enums::Relationship;
use lerni_core::ids::{PREFIX_ANSWER, PREFIX_QUESTION};
use lerni_core::responses::{QuestionDetail, QuestionStats, TodaySummary};
use tracing::debug;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_int, get_opt_int, get_opt_string, non_blank, parse_datetime,
    parse_string_list, placeholders, query_count, to_json_text,
};
use crate::repos::answer::{insert_answer, require_answer};
use crate::repos::concept::{fetch_concept, load_graph, require_concept};
use crate::service::LerniService;
use crate::updates::question::{NewQuestion, QuestionMetaUpdate};
use crate::{finish, generate_id};

pub(crate) const QUESTION_COLS: &str = "id, concept_id, prompt, current_answer_id, \
     easiness_factor, interval_days, repetitions, next_review_at, \
     difficulty, source_refs, created_at, updated_at";

pub(crate) fn row_to_question(row: &libsql::Row) -> Result<Question, DatabaseError> {
    Ok(Question {
        id: row.get(0)?,
        concept_id: get_opt_string(row, 1)?,
        prompt: row.get(2)?,
        current_answer_id: row.get(3)?,
        schedule_state: ScheduleState {
            easiness_factor: row.get::<f64>(4)?,
            interval: get_int(row, 5)?,
            repetitions: get_int(row, 6)?,
            next_review_at: parse_datetime(&row.get::<String>(7)?)?,
        },
        difficulty: get_opt_int(row, 8)?,
        source_refs: parse_string_list(&row.get::<String>(9)?)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

pub(crate) async fn fetch_question(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<Question>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {QUESTION_COLS} FROM questions WHERE id = ?1"),
            [id],
        )
        .await?;
    rows.next().await?.map(|row| row_to_question(&row)).transpose()
}

pub(crate) async fn require_question(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Question, DatabaseError> {
    fetch_question(conn, id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("question", id))
}

async fn query_questions(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<Question>, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let mut questions = Vec::new();
    while let Some(row) = rows.next().await? {
        questions.push(row_to_question(&row)?);
    }
    Ok(questions)
}

/// Overwrite the stored schedule of a question.
pub(crate) async fn write_schedule(
    conn: &libsql::Connection,
    question_id: &str,
    state: &ScheduleState,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE questions
         SET easiness_factor = ?1, interval_days = ?2, repetitions = ?3,
             next_review_at = ?4, updated_at = ?5
         WHERE id = ?6",
        libsql::params![
            state.easiness_factor,
            i64::from(state.interval),
            i64::from(state.repetitions),
            fmt_datetime(state.next_review_at),
            fmt_datetime(now),
            question_id
        ],
    )
    .await?;
    Ok(())
}

fn validate_difficulty(difficulty: Option<u8>) -> Result<(), DatabaseError> {
    match difficulty {
        Some(d) if !(1..=5).contains(&d) => Err(DatabaseError::validation(format!(
            "Difficulty must be between 1 and 5, got {d}"
        ))),
        _ => Ok(()),
    }
}

/// Trim, drop blanks, and drop repeats while keeping first-seen order.
fn merge_sources(existing: &[String], add: &[String], remove: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + add.len());
    for source in existing.iter().chain(add) {
        let source = source.trim();
        if !source.is_empty()
            && !merged.iter().any(|s| s == source)
            && !remove.iter().any(|r| r.trim() == source)
        {
            merged.push(source.to_string());
        }
    }
    merged
}

/// Filter for [`LerniService::list_questions`].
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Only questions assigned to this concept.
    pub concept_id: Option<String>,
    /// Only questions with no concept. Ignored when `concept_id` is set.
    pub uncategorized: bool,
    pub limit: Option<u32>,
}

impl LerniService {
    /// Create a question with a fresh schedule and its first answer.
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` for an empty prompt, empty notes, or a
    ///   difficulty outside 1..=5.
    /// - `CoreError::NotFound` if `concept_id` names no concept.
    pub async fn create_question(
        &self,
        new: &NewQuestion,
    ) -> Result<(Question, Answer), DatabaseError> {
        let prompt = new.prompt.trim();
        if prompt.is_empty() {
            return Err(DatabaseError::validation("Question prompt must not be empty"));
        }
        let Some(raw_notes) = non_blank(new.answer.raw_notes.as_deref()) else {
            return Err(DatabaseError::validation("Initial notes must not be empty"));
        };
        validate_difficulty(new.difficulty)?;
        let now = self.now();

        let tx = self.db().begin().await?;
        let result: Result<(Question, Answer), DatabaseError> = async {
            if let Some(concept_id) = new.concept_id.as_deref() {
                require_concept(&tx, concept_id).await?;
            }
            let question_id = generate_id(&tx, PREFIX_QUESTION).await?;
            let answer_id = generate_id(&tx, PREFIX_ANSWER).await?;

            let question = Question {
                id: question_id,
                concept_id: new.concept_id.clone(),
                prompt: prompt.to_string(),
                current_answer_id: answer_id.clone(),
                schedule_state: ScheduleState::initial(now),
                difficulty: new.difficulty,
                source_refs: merge_sources(&[], &new.source_refs, &[]),
                created_at: now,
                updated_at: now,
            };
            tx.execute(
                &format!(
                    "INSERT INTO questions ({QUESTION_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                libsql::params![
                    question.id.as_str(),
                    question.concept_id.as_deref(),
                    question.prompt.as_str(),
                    question.current_answer_id.as_str(),
                    question.schedule_state.easiness_factor,
                    i64::from(question.schedule_state.interval),
                    i64::from(question.schedule_state.repetitions),
                    fmt_datetime(question.schedule_state.next_review_at),
                    question.difficulty.map(i64::from),
                    to_json_text(&question.source_refs)?,
                    fmt_datetime(now),
                    fmt_datetime(now)
                ],
            )
            .await?;

            let blank = Answer {
                id: answer_id,
                question_id: question.id.clone(),
                raw_notes,
                simple_explanation: None,
                gaps_questions: None,
                final_explanation: None,
                analogies_examples: None,
                created_at: now,
            };
            let answer = new.answer.apply_to(&blank);
            insert_answer(&tx, &answer).await?;
            Ok((question, answer))
        }
        .await;
        let (question, answer) = finish(tx, result).await?;
        debug!(question_id = %question.id, answer_id = %answer.id, "created question");
        Ok((question, answer))
    }

    pub async fn get_question(&self, id: &str) -> Result<Question, DatabaseError> {
        require_question(self.db().conn(), id).await
    }

    /// A question with its current answer, concept, and version count.
    pub async fn question_detail(&self, id: &str) -> Result<QuestionDetail, DatabaseError> {
        let conn = self.db().conn();
        let question = require_question(conn, id).await?;
        let answer = require_answer(conn, &question.current_answer_id).await?;
        let concept = match question.concept_id.as_deref() {
            Some(concept_id) => fetch_concept(conn, concept_id).await?,
            None => None,
        };
        let versions = query_count(
            conn,
            "SELECT COUNT(*) FROM answers WHERE question_id = ?1",
            [id],
        )
        .await?;
        Ok(QuestionDetail {
            question,
            answer,
            concept,
            versions: u32::try_from(versions).unwrap_or(u32::MAX),
        })
    }

    /// Questions with `next_review_at <= as_of`, ordered by `(next_review_at, id)`.
    ///
    /// With `subtree`, only questions assigned to that concept or to a concept
    /// below it through parent edges.
    pub async fn due(
        &self,
        as_of: DateTime<Utc>,
        subtree: Option<&str>,
    ) -> Result<Vec<Question>, DatabaseError> {
        let conn = self.db().conn();
        let Some(root) = subtree else {
            return query_questions(
                conn,
                &format!(
                    "SELECT {QUESTION_COLS} FROM questions
                     WHERE next_review_at <= ?1
                     ORDER BY next_review_at, id"
                ),
                [fmt_datetime(as_of)],
            )
            .await;
        };

        require_concept(conn, root).await?;
        let graph = load_graph(conn, Relationship::Parent).await?;
        let concept_ids = graph.subtree(root);
        let sql = format!(
            "SELECT {QUESTION_COLS} FROM questions
             WHERE next_review_at <= ?1 AND concept_id IN ({})
             ORDER BY next_review_at, id",
            placeholders(2, concept_ids.len())
        );
        let params = std::iter::once(libsql::Value::from(fmt_datetime(as_of)))
            .chain(concept_ids.into_iter().map(libsql::Value::from));
        query_questions(conn, &sql, libsql::params_from_iter(params)).await
    }

    /// Questions that become due in `(as_of, as_of + days]`.
    pub async fn upcoming(
        &self,
        as_of: DateTime<Utc>,
        days: u32,
    ) -> Result<Vec<Question>, DatabaseError> {
        let until = as_of + Duration::days(i64::from(days));
        query_questions(
            self.db().conn(),
            &format!(
                "SELECT {QUESTION_COLS} FROM questions
                 WHERE next_review_at > ?1 AND next_review_at <= ?2
                 ORDER BY next_review_at, id"
            ),
            [fmt_datetime(as_of), fmt_datetime(until)],
        )
        .await
    }

    /// Assign a question to a concept, replacing any previous assignment.
    pub async fn assign(&self, question_id: &str, concept_id: &str) -> Result<Question, DatabaseError> {
        self.set_concept(question_id, Some(concept_id)).await
    }

    /// Move a question back to uncategorized.
    pub async fn unassign(&self, question_id: &str) -> Result<Question, DatabaseError> {
        self.set_concept(question_id, None).await
    }

    async fn set_concept(
        &self,
        question_id: &str,
        concept_id: Option<&str>,
    ) -> Result<Question, DatabaseError> {
        let now = self.now();
        let tx = self.db().begin().await?;
        let result: Result<Question, DatabaseError> = async {
            require_question(&tx, question_id).await?;
            if let Some(concept_id) = concept_id {
                require_concept(&tx, concept_id).await?;
            }
            tx.execute(
                "UPDATE questions SET concept_id = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![concept_id, fmt_datetime(now), question_id],
            )
            .await?;
            require_question(&tx, question_id).await
        }
        .await;
        let question = finish(tx, result).await?;
        debug!(question_id, concept_id = ?concept_id, "assigned question");
        Ok(question)
    }

    pub async fn list_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<Question>, DatabaseError> {
        let mut sql = format!("SELECT {QUESTION_COLS} FROM questions");
        let mut params: Vec<libsql::Value> = Vec::new();
        if let Some(concept_id) = &filter.concept_id {
            sql.push_str(" WHERE concept_id = ?1");
            params.push(concept_id.clone().into());
        } else if filter.uncategorized {
            sql.push_str(" WHERE concept_id IS NULL");
        }
        sql.push_str(" ORDER BY created_at, id");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        query_questions(self.db().conn(), &sql, libsql::params_from_iter(params)).await
    }

    /// Case-insensitive substring match over prompts.
    pub async fn search_questions(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Question>, DatabaseError> {
        query_questions(
            self.db().conn(),
            &format!(
                "SELECT {QUESTION_COLS} FROM questions
                 WHERE instr(lower(prompt), lower(?1)) > 0
                 ORDER BY created_at, id
                 LIMIT ?2"
            ),
            libsql::params![query.trim(), i64::from(limit)],
        )
        .await
    }

    /// Update difficulty and source references.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a difficulty outside 1..=5.
    pub async fn update_meta(
        &self,
        question_id: &str,
        update: &QuestionMetaUpdate,
    ) -> Result<Question, DatabaseError> {
        if let Some(difficulty) = update.difficulty {
            validate_difficulty(difficulty)?;
        }
        if update.is_empty() {
            return self.get_question(question_id).await;
        }
        let now = self.now();

        let tx = self.db().begin().await?;
        let result: Result<Question, DatabaseError> = async {
            let question = require_question(&tx, question_id).await?;
            let difficulty = update.difficulty.unwrap_or(question.difficulty);
            let sources = merge_sources(
                &question.source_refs,
                &update.add_sources,
                &update.remove_sources,
            );
            tx.execute(
                "UPDATE questions SET difficulty = ?1, source_refs = ?2, updated_at = ?3
                 WHERE id = ?4",
                libsql::params![
                    difficulty.map(i64::from),
                    to_json_text(&sources)?,
                    fmt_datetime(now),
                    question_id
                ],
            )
            .await?;
            require_question(&tx, question_id).await
        }
        .await;
        let question = finish(tx, result).await?;
        debug!(question_id, "updated question metadata");
        Ok(question)
    }

    /// Delete a question together with its answers and reviews.
    pub async fn delete_question(&self, question_id: &str) -> Result<(), DatabaseError> {
        let tx = self.db().begin().await?;
        let result: Result<(), DatabaseError> = async {
            require_question(&tx, question_id).await?;
            tx.execute("DELETE FROM reviews WHERE question_id = ?1", [question_id])
                .await?;
            tx.execute("DELETE FROM answers WHERE question_id = ?1", [question_id])
                .await?;
            tx.execute("DELETE FROM questions WHERE id = ?1", [question_id])
                .await?;
            Ok(())
        }
        .await;
        finish(tx, result).await?;
        debug!(question_id, "deleted question");
        Ok(())
    }

    pub async fn question_stats(&self, as_of: DateTime<Utc>) -> Result<QuestionStats, DatabaseError> {
        let conn = self.db().conn();
        Ok(QuestionStats {
            total: query_count(conn, "SELECT COUNT(*) FROM questions", ()).await?,
            due: query_count(
                conn,
                "SELECT COUNT(*) FROM questions WHERE next_review_at <= ?1",
                [fmt_datetime(as_of)],
            )
            .await?,
            uncategorized: query_count(
                conn,
                "SELECT COUNT(*) FROM questions WHERE concept_id IS NULL",
                (),
            )
            .await?,
        })
    }

    /// Due questions, the ones coming up within `lookahead_days`, and counts.
    pub async fn today(
        &self,
        as_of: DateTime<Utc>,
        lookahead_days: u32,
    ) -> Result<TodaySummary, DatabaseError> {
        Ok(TodaySummary {
            as_of,
            due: self.due(as_of, None).await?,
            upcoming: self.upcoming(as_of, lookahead_days).await?,
            lookahead_days,
            stats: self.question_stats(as_of).await?,
        })
    }
}
