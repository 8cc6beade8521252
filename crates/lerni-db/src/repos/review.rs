//! Review orchestrator: the two-stage recall protocol.
//!
//! ```text
//! start_review → recall (grades 3-5) → grade → completed
//!              → forget (grades 0-2) → grade → completed
//!              → skip                           skipped
//! ```
//!
//! The stage lives in the review row itself (see `Review::stage`), so a
//! session survives process restarts. Grading re-reads the question inside
//! the write transaction and commits the new schedule together with the
//! completed review.

use lerni_core::entities::Review;
use lerni_core::enums::{RecallStage, ReviewStatus};
use lerni_core::errors::CoreError;
use lerni_core::ids::PREFIX_REVIEW;
use lerni_core::responses::{GradedReview, RevealedAnswer, ReviewSession, SkippedReview};
use lerni_core::sm2::{self, MAX_GRADE};
use tracing::debug;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_opt_bool, get_opt_int, get_opt_string, non_blank, parse_datetime,
    parse_enum, parse_optional_datetime,
};
use crate::repos::answer::require_answer;
use crate::repos::concept::fetch_concept;
use crate::repos::question::{require_question, write_schedule};
use crate::service::LerniService;
use crate::{finish, generate_id};

const REVIEW_COLS: &str = "id, question_id, answer_id, scheduled_for, completed_at, status, \
     self_grade, attempted_explanation, recalled_from_memory, gaps_identified, notes";

fn row_to_review(row: &libsql::Row) -> Result<Review, DatabaseError> {
    Ok(Review {
        id: row.get(0)?,
        question_id: row.get(1)?,
        answer_id: row.get(2)?,
        scheduled_for: parse_datetime(&row.get::<String>(3)?)?,
        completed_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        status: parse_enum(&row.get::<String>(5)?)?,
        self_grade: get_opt_int(row, 6)?,
        attempted_explanation: get_opt_string(row, 7)?,
        recalled_from_memory: get_opt_bool(row, 8)?,
        gaps_identified: get_opt_string(row, 9)?,
        notes: get_opt_string(row, 10)?,
    })
}

async fn query_reviews(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<Review>, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let mut reviews = Vec::new();
    while let Some(row) = rows.next().await? {
        reviews.push(row_to_review(&row)?);
    }
    Ok(reviews)
}

async fn require_review(conn: &libsql::Connection, id: &str) -> Result<Review, DatabaseError> {
    query_reviews(
        conn,
        &format!("SELECT {REVIEW_COLS} FROM reviews WHERE id = ?1"),
        [id],
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| DatabaseError::not_found("review", id))
}

async fn pending_for(
    conn: &libsql::Connection,
    question_id: &str,
) -> Result<Option<Review>, DatabaseError> {
    Ok(query_reviews(
        conn,
        &format!("SELECT {REVIEW_COLS} FROM reviews WHERE question_id = ?1 AND status = 'pending'"),
        [question_id],
    )
    .await?
    .into_iter()
    .next())
}

/// Insert a fresh pending review of the question's current answer.
async fn open_review(
    conn: &libsql::Connection,
    question_id: &str,
) -> Result<Review, DatabaseError> {
    let question = require_question(conn, question_id).await?;
    let id = generate_id(conn, PREFIX_REVIEW).await?;
    conn.execute(
        "INSERT INTO reviews (id, question_id, answer_id, scheduled_for, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        libsql::params![
            id.as_str(),
            question_id,
            question.current_answer_id.as_str(),
            fmt_datetime(question.schedule_state.next_review_at),
            ReviewStatus::Pending.as_str()
        ],
    )
    .await?;
    require_review(conn, &id).await
}

fn invalid_transition(review: &Review, to: RecallStage) -> DatabaseError {
    CoreError::InvalidTransition {
        entity_type: "review".to_string(),
        id: review.id.clone(),
        from: review.stage().to_string(),
        to: to.to_string(),
    }
    .into()
}

fn ensure_transition(review: &Review, to: RecallStage) -> Result<(), DatabaseError> {
    if review.stage().can_transition_to(to) {
        Ok(())
    } else {
        Err(invalid_transition(review, to))
    }
}

impl LerniService {
    /// Open a review session for a question, or resume the pending one.
    ///
    /// The session is pinned to the answer that is current right now; the
    /// response carries the prompt but never the answer.
    pub async fn start_review(&self, question_id: &str) -> Result<ReviewSession, DatabaseError> {
        let tx = self.db().begin().await?;
        let result: Result<ReviewSession, DatabaseError> = async {
            let question = require_question(&tx, question_id).await?;
            let (review, resumed) = match pending_for(&tx, question_id).await? {
                Some(review) => (review, true),
                None => (open_review(&tx, question_id).await?, false),
            };
            let concept = match question.concept_id.as_deref() {
                Some(concept_id) => fetch_concept(&tx, concept_id).await?,
                None => None,
            };
            Ok(ReviewSession {
                stage: review.stage(),
                review,
                prompt: question.prompt,
                concept,
                difficulty: question.difficulty,
                schedule_state: question.schedule_state,
                resumed,
            })
        }
        .await;
        let session = finish(tx, result).await?;
        debug!(
            question_id,
            review_id = %session.review.id,
            resumed = session.resumed,
            "started review"
        );
        Ok(session)
    }

    /// Start (or resume) a review of the question that has been due longest.
    ///
    /// `subtree` limits the queue as in [`Self::due`]. Returns `None` when
    /// nothing is due.
    pub async fn start_next_due(
        &self,
        subtree: Option<&str>,
    ) -> Result<Option<ReviewSession>, DatabaseError> {
        let due = self.due(self.now(), subtree).await?;
        let Some(question) = due.first() else {
            debug!(subtree, "nothing due");
            return Ok(None);
        };
        self.start_review(&question.id).await.map(Some)
    }

    /// The user explained the answer from memory. Reveals the answer for
    /// comparison and allows grades 3-5.
    pub async fn recall(
        &self,
        review_id: &str,
        attempted_explanation: &str,
    ) -> Result<RevealedAnswer, DatabaseError> {
        self.resolve_recall(review_id, true, Some(attempted_explanation), None)
            .await
    }

    /// The user could not recall. Reveals the answer and allows grades 0-2.
    pub async fn forget(
        &self,
        review_id: &str,
        attempted_explanation: Option<&str>,
        gaps_identified: Option<&str>,
    ) -> Result<RevealedAnswer, DatabaseError> {
        self.resolve_recall(review_id, false, attempted_explanation, gaps_identified)
            .await
    }

    async fn resolve_recall(
        &self,
        review_id: &str,
        recalled: bool,
        attempted_explanation: Option<&str>,
        gaps_identified: Option<&str>,
    ) -> Result<RevealedAnswer, DatabaseError> {
        let stage = if recalled {
            RecallStage::Recalled
        } else {
            RecallStage::Failed
        };

        let tx = self.db().begin().await?;
        let result: Result<RevealedAnswer, DatabaseError> = async {
            let review = require_review(&tx, review_id).await?;
            ensure_transition(&review, stage)?;
            tx.execute(
                "UPDATE reviews
                 SET recalled_from_memory = ?1, attempted_explanation = ?2, gaps_identified = ?3
                 WHERE id = ?4",
                libsql::params![
                    i64::from(recalled),
                    non_blank(attempted_explanation),
                    non_blank(gaps_identified),
                    review_id
                ],
            )
            .await?;
            let review = require_review(&tx, review_id).await?;
            let answer = require_answer(&tx, &review.answer_id).await?;
            let allowed = stage.permitted_grades().ok_or_else(|| {
                DatabaseError::Query(format!("Stage {stage} has no grade range"))
            })?;
            Ok(RevealedAnswer {
                stage: review.stage(),
                review,
                answer,
                allowed_grades: (*allowed.start(), *allowed.end()),
            })
        }
        .await;
        let revealed = finish(tx, result).await?;
        debug!(review_id, stage = %revealed.stage, "resolved recall");
        Ok(revealed)
    }

    /// Grade a review and reschedule its question.
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` if `grade > 5`.
    /// - `CoreError::InvalidTransition` if the review is not waiting for a grade.
    /// - `CoreError::GradeMismatch` if the grade contradicts the recall outcome.
    pub async fn grade(
        &self,
        review_id: &str,
        grade: u8,
        notes: Option<&str>,
    ) -> Result<GradedReview, DatabaseError> {
        if grade > MAX_GRADE {
            return Err(DatabaseError::validation(format!(
                "Grade must be between 0 and {MAX_GRADE}, got {grade}"
            )));
        }
        let now = self.now();

        let tx = self.db().begin().await?;
        let result: Result<GradedReview, DatabaseError> = async {
            let review = require_review(&tx, review_id).await?;
            let stage = review.stage();
            let Some(allowed) = stage.permitted_grades() else {
                return Err(invalid_transition(&review, RecallStage::Graded));
            };
            if !allowed.contains(&grade) {
                return Err(CoreError::GradeMismatch {
                    grade,
                    stage,
                    allowed: format!("{}-{}", allowed.start(), allowed.end()),
                }
                .into());
            }

            let question = require_question(&tx, &review.question_id).await?;
            let next = sm2::compute(&question.schedule_state, grade, now)?;
            write_schedule(&tx, &question.id, &next, now).await?;

            let completed = tx
                .execute(
                    "UPDATE reviews
                     SET status = ?1, self_grade = ?2, notes = ?3, completed_at = ?4
                     WHERE id = ?5 AND status = ?6",
                    libsql::params![
                        ReviewStatus::Completed.as_str(),
                        i64::from(grade),
                        non_blank(notes),
                        fmt_datetime(now),
                        review_id,
                        ReviewStatus::Pending.as_str()
                    ],
                )
                .await?;
            if completed != 1 {
                return Err(invalid_transition(&review, RecallStage::Completed));
            }

            Ok(GradedReview {
                review: require_review(&tx, review_id).await?,
                grade_description: sm2::grade_description(grade).to_string(),
                previous: question.schedule_state,
                schedule_state: next,
                interval_label: sm2::format_interval(next.interval),
            })
        }
        .await;
        let graded = finish(tx, result).await?;
        debug!(
            review_id,
            question_id = %graded.review.question_id,
            grade,
            interval = graded.schedule_state.interval,
            "graded review"
        );
        Ok(graded)
    }

    /// Skip a question for now.
    ///
    /// Reuses the pending review if there is one, marks it skipped, and moves
    /// `next_review_at` forward by the skip delay. Easiness factor, interval,
    /// and repetitions are left alone.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the pending review has
    /// already been recalled or failed.
    pub async fn skip(&self, question_id: &str) -> Result<SkippedReview, DatabaseError> {
        let now = self.now();
        let next_review_at = now + self.policy().skip_delay;

        let tx = self.db().begin().await?;
        let result: Result<SkippedReview, DatabaseError> = async {
            let review = match pending_for(&tx, question_id).await? {
                Some(review) => review,
                None => open_review(&tx, question_id).await?,
            };
            ensure_transition(&review, RecallStage::Skipped)?;

            tx.execute(
                "UPDATE reviews SET status = ?1, completed_at = ?2 WHERE id = ?3",
                libsql::params![
                    ReviewStatus::Skipped.as_str(),
                    fmt_datetime(now),
                    review.id.as_str()
                ],
            )
            .await?;
            tx.execute(
                "UPDATE questions SET next_review_at = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![fmt_datetime(next_review_at), fmt_datetime(now), question_id],
            )
            .await?;
            Ok(SkippedReview {
                review: require_review(&tx, &review.id).await?,
                next_review_at,
            })
        }
        .await;
        let skipped = finish(tx, result).await?;
        debug!(question_id, review_id = %skipped.review.id, "skipped review");
        Ok(skipped)
    }

    pub async fn get_review(&self, review_id: &str) -> Result<Review, DatabaseError> {
        require_review(self.db().conn(), review_id).await
    }

    /// All reviews of a question, newest first.
    pub async fn reviews_for(&self, question_id: &str) -> Result<Vec<Review>, DatabaseError> {
        let conn = self.db().conn();
        require_question(conn, question_id).await?;
        query_reviews(
            conn,
            &format!(
                "SELECT {REVIEW_COLS} FROM reviews WHERE question_id = ?1 ORDER BY rowid DESC"
            ),
            [question_id],
        )
        .await
    }

    pub async fn pending_review_for(
        &self,
        question_id: &str,
    ) -> Result<Option<Review>, DatabaseError> {
        let conn = self.db().conn();
        require_question(conn, question_id).await?;
        pending_for(conn, question_id).await
    }
}
