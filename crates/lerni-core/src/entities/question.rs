use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sm2::{DEFAULT_EASINESS_FACTOR, MIN_EASINESS_FACTOR};

/// SM-2 scheduling state embedded in a question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScheduleState {
    /// Always `>= 1.3`.
    pub easiness_factor: f64,
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive successful reviews.
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
}

impl ScheduleState {
    /// Fresh state for a new question: due immediately.
    #[must_use]
    pub const fn initial(now: DateTime<Utc>) -> Self {
        Self {
            easiness_factor: DEFAULT_EASINESS_FACTOR,
            interval: 0,
            repetitions: 0,
            next_review_at: now,
        }
    }

    #[must_use]
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_at <= as_of
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.easiness_factor >= MIN_EASINESS_FACTOR
    }
}

/// A study card: one prompt, one current answer, one schedule.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Question {
    pub id: String,
    /// Weak reference; `None` means uncategorized.
    pub concept_id: Option<String>,
    pub prompt: String,
    pub current_answer_id: String,
    pub schedule_state: ScheduleState,
    /// 1 (easy) to 5 (hard), when rated.
    pub difficulty: Option<u8>,
    /// URLs, books, and other citations.
    pub source_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    #[must_use]
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.schedule_state.is_due(as_of)
    }
}
