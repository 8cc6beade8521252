use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{RecallStage, ReviewStatus};

/// One review session for a question, pinned to the answer version shown.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Review {
    pub id: String,
    pub question_id: String,
    /// Answer current when the session started.
    pub answer_id: String,
    pub scheduled_for: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: ReviewStatus,
    pub self_grade: Option<u8>,
    pub attempted_explanation: Option<String>,
    pub recalled_from_memory: Option<bool>,
    pub gaps_identified: Option<String>,
    pub notes: Option<String>,
}

impl Review {
    /// Recall stage encoded by the persisted row.
    #[must_use]
    pub const fn stage(&self) -> RecallStage {
        match (self.status, self.recalled_from_memory) {
            (ReviewStatus::Pending, None) => RecallStage::AwaitingRecall,
            (ReviewStatus::Pending, Some(true)) => RecallStage::Recalled,
            (ReviewStatus::Pending, Some(false)) => RecallStage::Failed,
            (ReviewStatus::Completed, _) => RecallStage::Completed,
            (ReviewStatus::Skipped, _) => RecallStage::Skipped,
        }
    }
}
