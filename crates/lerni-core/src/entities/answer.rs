use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AnswerField;

/// One version of the explain-to-learn content for a question.
///
/// Answers are snapshots: once a review has graded against an answer, that
/// answer is never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Answer {
    pub id: String,
    pub question_id: String,
    pub raw_notes: String,
    pub simple_explanation: Option<String>,
    pub gaps_questions: Option<String>,
    pub final_explanation: Option<String>,
    pub analogies_examples: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Answer {
    #[must_use]
    pub fn field(&self, field: AnswerField) -> Option<&str> {
        match field {
            AnswerField::RawNotes => Some(self.raw_notes.as_str()),
            AnswerField::SimpleExplanation => self.simple_explanation.as_deref(),
            AnswerField::GapsQuestions => self.gaps_questions.as_deref(),
            AnswerField::FinalExplanation => self.final_explanation.as_deref(),
            AnswerField::AnalogiesExamples => self.analogies_examples.as_deref(),
        }
    }

    /// The explanation to show when the user could not recall: the most
    /// refined step that has content.
    #[must_use]
    pub fn best_explanation(&self) -> &str {
        self.final_explanation
            .as_deref()
            .or(self.simple_explanation.as_deref())
            .unwrap_or(&self.raw_notes)
    }
}

/// A partial set of answer fields. `None` leaves a field as it was.
///
/// An empty string clears an optional field; `raw_notes` can never be cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnswerFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaps_questions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analogies_examples: Option<String>,
}

impl AnswerFields {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw_notes.is_none()
            && self.simple_explanation.is_none()
            && self.gaps_questions.is_none()
            && self.final_explanation.is_none()
            && self.analogies_examples.is_none()
    }

    pub fn set(&mut self, field: AnswerField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            AnswerField::RawNotes => self.raw_notes = value,
            AnswerField::SimpleExplanation => self.simple_explanation = value,
            AnswerField::GapsQuestions => self.gaps_questions = value,
            AnswerField::FinalExplanation => self.final_explanation = value,
            AnswerField::AnalogiesExamples => self.analogies_examples = value,
        }
    }

    /// Overlay these fields on `base`, returning the merged content.
    ///
    /// Identity fields (`id`, `question_id`, `created_at`) are kept from `base`.
    #[must_use]
    pub fn apply_to(&self, base: &Answer) -> Answer {
        fn overlay(patch: Option<&String>, current: Option<&String>) -> Option<String> {
            match patch {
                Some(value) if value.trim().is_empty() => None,
                Some(value) => Some(value.clone()),
                None => current.cloned(),
            }
        }

        Answer {
            id: base.id.clone(),
            question_id: base.question_id.clone(),
            raw_notes: match &self.raw_notes {
                Some(value) if !value.trim().is_empty() => value.clone(),
                _ => base.raw_notes.clone(),
            },
            simple_explanation: overlay(
                self.simple_explanation.as_ref(),
                base.simple_explanation.as_ref(),
            ),
            gaps_questions: overlay(self.gaps_questions.as_ref(), base.gaps_questions.as_ref()),
            final_explanation: overlay(
                self.final_explanation.as_ref(),
                base.final_explanation.as_ref(),
            ),
            analogies_examples: overlay(
                self.analogies_examples.as_ref(),
                base.analogies_examples.as_ref(),
            ),
            created_at: base.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Answer {
        Answer {
            id: "ans-00000001".into(),
            question_id: "qst-00000001".into(),
            raw_notes: "closures capture their environment".into(),
            simple_explanation: Some("a function that remembers".into()),
            gaps_questions: Some("how does move work?".into()),
            final_explanation: None,
            analogies_examples: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn apply_keeps_unspecified_fields() {
        let mut fields = AnswerFields::default();
        fields.set(AnswerField::FinalExplanation, "refined");
        let merged = fields.apply_to(&base());

        assert_eq!(merged.raw_notes, "closures capture their environment");
        assert_eq!(merged.simple_explanation.as_deref(), Some("a function that remembers"));
        assert_eq!(merged.final_explanation.as_deref(), Some("refined"));
    }

    #[test]
    fn empty_string_clears_optional_field_but_not_raw_notes() {
        let fields = AnswerFields {
            raw_notes: Some("  ".into()),
            gaps_questions: Some(String::new()),
            ..AnswerFields::default()
        };
        let merged = fields.apply_to(&base());

        assert_eq!(merged.raw_notes, "closures capture their environment");
        assert_eq!(merged.gaps_questions, None);
    }

    #[test]
    fn best_explanation_prefers_most_refined_step() {
        let mut answer = base();
        assert_eq!(answer.best_explanation(), "a function that remembers");
        answer.final_explanation = Some("final".into());
        assert_eq!(answer.best_explanation(), "final");
        answer.final_explanation = None;
        answer.simple_explanation = None;
        assert_eq!(answer.best_explanation(), "closures capture their environment");
    }
}
