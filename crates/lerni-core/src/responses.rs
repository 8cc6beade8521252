//! Response types returned by the store and rendered by `study` commands.
//!
//! These structs define the shape of JSON output for commands like
//! `study review start`, `study review grade`, `study concept show`, and
//! `study today`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Answer, Concept, ConceptEdge, Question, Review, ScheduleState};
use crate::enums::RecallStage;

/// Response from `study show`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct QuestionDetail {
    pub question: Question,
    pub answer: Answer,
    pub concept: Option<Concept>,
    pub versions: u32,
}

/// Response from `study edit`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EditOutcome {
    pub answer: Answer,
    /// `true` when the current answer was already reviewed and the edit was
    /// written as a new version.
    pub forked: bool,
}

/// Response from `study review start`. Never contains the answer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ReviewSession {
    pub review: Review,
    pub stage: RecallStage,
    pub prompt: String,
    pub concept: Option<Concept>,
    pub difficulty: Option<u8>,
    pub schedule_state: ScheduleState,
    /// `true` when an existing pending review was picked up again.
    pub resumed: bool,
}

/// Response from `study review recall` and `study review forget`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RevealedAnswer {
    pub review: Review,
    pub stage: RecallStage,
    /// The answer version captured when the review started.
    pub answer: Answer,
    /// Lowest and highest grade accepted in this stage.
    pub allowed_grades: (u8, u8),
}

/// Response from `study review grade`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GradedReview {
    pub review: Review,
    pub grade_description: String,
    pub previous: ScheduleState,
    pub schedule_state: ScheduleState,
    pub interval_label: String,
}

/// Response from `study review skip`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SkippedReview {
    pub review: Review,
    pub next_review_at: DateTime<Utc>,
}

/// Direct neighbors of a concept, grouped by relationship and direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConceptNeighbors {
    pub parents: Vec<Concept>,
    pub children: Vec<Concept>,
    pub prerequisites: Vec<Concept>,
    pub required_by: Vec<Concept>,
    pub related: Vec<Concept>,
}

/// Response from `study concept show`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConceptDetail {
    pub concept: Concept,
    #[serde(flatten)]
    pub neighbors: ConceptNeighbors,
    pub question_count: u64,
}

/// Response from `study concept link`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LinkResponse {
    pub edge: ConceptEdge,
    pub from: Concept,
    pub to: Concept,
}

/// Question counts shown by `study today`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuestionStats {
    pub total: u64,
    pub due: u64,
    pub uncategorized: u64,
}

/// Response from `study today`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TodaySummary {
    pub as_of: DateTime<Utc>,
    pub due: Vec<Question>,
    pub upcoming: Vec<Question>,
    pub lookahead_days: u32,
    pub stats: QuestionStats,
}
