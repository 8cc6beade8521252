//! Question creation input and metadata update builder.

use lerni_core::entities::AnswerFields;
use serde::Serialize;

/// Everything needed to create a question and its first answer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewQuestion {
    pub prompt: String,
    pub concept_id: Option<String>,
    pub difficulty: Option<u8>,
    /// Content of the first answer. `raw_notes` is required.
    pub answer: AnswerFields,
    pub source_refs: Vec<String>,
}

impl NewQuestion {
    #[must_use]
    pub fn new(prompt: impl Into<String>, raw_notes: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: AnswerFields {
                raw_notes: Some(raw_notes.into()),
                ..AnswerFields::default()
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn concept(mut self, concept_id: impl Into<String>) -> Self {
        self.concept_id = Some(concept_id.into());
        self
    }

    #[must_use]
    pub fn difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn answer(mut self, answer: AnswerFields) -> Self {
        let raw_notes = self.answer.raw_notes.take();
        self.answer = answer;
        if self.answer.raw_notes.is_none() {
            self.answer.raw_notes = raw_notes;
        }
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source_refs.push(source.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct QuestionMetaUpdate {
    /// `Some(None)` clears the rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Option<u8>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_sources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_sources: Vec<String>,
}

impl QuestionMetaUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.difficulty.is_none() && self.add_sources.is_empty() && self.remove_sources.is_empty()
    }
}

pub struct QuestionMetaUpdateBuilder(QuestionMetaUpdate);

impl QuestionMetaUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(QuestionMetaUpdate::default())
    }

    #[must_use]
    pub fn difficulty(mut self, difficulty: Option<u8>) -> Self {
        self.0.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn add_source(mut self, source: impl Into<String>) -> Self {
        self.0.add_sources.push(source.into());
        self
    }

    #[must_use]
    pub fn remove_source(mut self, source: impl Into<String>) -> Self {
        self.0.remove_sources.push(source.into());
        self
    }

    #[must_use]
    pub fn build(self) -> QuestionMetaUpdate {
        self.0
    }
}

impl Default for QuestionMetaUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
