//! Status enums, relationship kinds, and recall stages for Lerni.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

// ---------------------------------------------------------------------------
// Relationship
// ---------------------------------------------------------------------------

/// Kind of a directed edge between two concepts.
///
/// ```text
/// parent:       child → parent          ("Decorators" belongs to "Python")
/// prerequisite: concept → prerequisite  ("Decorators" requires "Closures")
/// related:      loose association, cycles allowed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Parent,
    Prerequisite,
    Related,
}

impl Relationship {
    pub const ALL: [Self; 3] = [Self::Parent, Self::Prerequisite, Self::Related];

    /// Whether edges of this kind must stay acyclic.
    #[must_use]
    pub const fn is_hierarchical(self) -> bool {
        matches!(self, Self::Parent | Self::Prerequisite)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Prerequisite => "prerequisite",
            Self::Related => "related",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReviewStatus
// ---------------------------------------------------------------------------

/// Persisted status of a review row.
///
/// ```text
/// pending → completed
///         → skipped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Completed,
    Skipped,
}

impl ReviewStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Completed, Self::Skipped],
            Self::Completed | Self::Skipped => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecallStage
// ---------------------------------------------------------------------------

/// Stage of the two-stage recall protocol for one review.
///
/// ```text
/// not_started → awaiting_recall → recalled → graded → completed
///             │                 → failed   → graded
///             └→ skipped        └→ skipped
/// ```
///
/// `graded` is transient: the grade is validated and the completion is
/// committed in the same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecallStage {
    NotStarted,
    AwaitingRecall,
    Recalled,
    Failed,
    Graded,
    Completed,
    Skipped,
}

impl RecallStage {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::NotStarted => &[Self::AwaitingRecall, Self::Skipped],
            Self::AwaitingRecall => &[Self::Recalled, Self::Failed, Self::Skipped],
            Self::Recalled | Self::Failed => &[Self::Graded],
            Self::Graded => &[Self::Completed],
            Self::Completed | Self::Skipped => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Grades a user may submit from this stage, if grading is possible at all.
    ///
    /// Recalled from memory: 3..=5. Needed to see the answer: 0..=2.
    #[must_use]
    pub const fn permitted_grades(self) -> Option<RangeInclusive<u8>> {
        match self {
            Self::Recalled => Some(3..=5),
            Self::Failed => Some(0..=2),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::AwaitingRecall => "awaiting_recall",
            Self::Recalled => "recalled",
            Self::Failed => "failed",
            Self::Graded => "graded",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for RecallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AnswerField
// ---------------------------------------------------------------------------

/// One step of the explain-to-learn workflow, as stored on an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnswerField {
    /// Step 1: dump everything you know.
    RawNotes,
    /// Step 2: explain it to a beginner.
    SimpleExplanation,
    /// Step 3: what you could not explain.
    GapsQuestions,
    /// Step 4: the refined explanation.
    FinalExplanation,
    /// Step 4 bonus.
    AnalogiesExamples,
}

impl AnswerField {
    pub const ALL: [Self; 5] = [
        Self::RawNotes,
        Self::SimpleExplanation,
        Self::GapsQuestions,
        Self::FinalExplanation,
        Self::AnalogiesExamples,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RawNotes => "raw_notes",
            Self::SimpleExplanation => "simple_explanation",
            Self::GapsQuestions => "gaps_questions",
            Self::FinalExplanation => "final_explanation",
            Self::AnalogiesExamples => "analogies_examples",
        }
    }

    /// Heading used in the editor template.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::RawNotes => "Raw notes",
            Self::SimpleExplanation => "Simple explanation",
            Self::GapsQuestions => "Gaps and questions",
            Self::FinalExplanation => "Final explanation",
            Self::AnalogiesExamples => "Analogies and examples",
        }
    }
}

impl fmt::Display for AnswerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(relationship_parent, Relationship, Relationship::Parent, "parent");
    test_serde_roundtrip!(
        relationship_prerequisite,
        Relationship,
        Relationship::Prerequisite,
        "prerequisite"
    );
    test_serde_roundtrip!(review_status_skipped, ReviewStatus, ReviewStatus::Skipped, "skipped");
    test_serde_roundtrip!(
        stage_awaiting_recall,
        RecallStage,
        RecallStage::AwaitingRecall,
        "awaiting_recall"
    );
    test_serde_roundtrip!(
        field_gaps_questions,
        AnswerField,
        AnswerField::GapsQuestions,
        "gaps_questions"
    );

    #[test]
    fn only_related_may_cycle() {
        assert!(Relationship::Parent.is_hierarchical());
        assert!(Relationship::Prerequisite.is_hierarchical());
        assert!(!Relationship::Related.is_hierarchical());
    }

    #[test]
    fn review_status_terminal_states() {
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Completed));
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Skipped));
        assert!(ReviewStatus::Completed.allowed_next_states().is_empty());
        assert!(ReviewStatus::Skipped.allowed_next_states().is_empty());
    }

    #[test]
    fn recall_stage_valid_transitions() {
        assert!(RecallStage::NotStarted.can_transition_to(RecallStage::AwaitingRecall));
        assert!(RecallStage::AwaitingRecall.can_transition_to(RecallStage::Recalled));
        assert!(RecallStage::AwaitingRecall.can_transition_to(RecallStage::Failed));
        assert!(RecallStage::Recalled.can_transition_to(RecallStage::Graded));
        assert!(RecallStage::Failed.can_transition_to(RecallStage::Graded));
        assert!(RecallStage::Graded.can_transition_to(RecallStage::Completed));
    }

    #[test]
    fn recall_stage_skip_only_before_recall() {
        assert!(RecallStage::NotStarted.can_transition_to(RecallStage::Skipped));
        assert!(RecallStage::AwaitingRecall.can_transition_to(RecallStage::Skipped));
        assert!(!RecallStage::Recalled.can_transition_to(RecallStage::Skipped));
        assert!(!RecallStage::Failed.can_transition_to(RecallStage::Skipped));
        assert!(!RecallStage::Completed.can_transition_to(RecallStage::Skipped));
    }

    #[test]
    fn permitted_grades_split_by_stage() {
        assert_eq!(RecallStage::Recalled.permitted_grades(), Some(3..=5));
        assert_eq!(RecallStage::Failed.permitted_grades(), Some(0..=2));
        assert_eq!(RecallStage::AwaitingRecall.permitted_grades(), None);
        assert_eq!(RecallStage::Completed.permitted_grades(), None);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", Relationship::Related), "related");
        assert_eq!(format!("{}", ReviewStatus::Pending), "pending");
        assert_eq!(format!("{}", RecallStage::NotStarted), "not_started");
        assert_eq!(format!("{}", AnswerField::AnalogiesExamples), "analogies_examples");
    }
}
