//! Domain error taxonomy for Lerni.
//!
//! These are the errors a caller can act on: bad input, unknown ids, graph
//! invariants, and review-stage violations. Storage failures are defined in
//! `lerni-db` (`DatabaseError`), which wraps this type. None of these variants
//! are retryable.

use thiserror::Error;

use crate::enums::{RecallStage, Relationship};

/// Errors raised by the scheduling and knowledge-graph rules.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation (grade out of range, empty name, self-loop, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Inserting the edge would close a cycle among edges of the same kind.
    #[error("Adding {relationship} edge {from} -> {to} would create a cycle")]
    Cycle {
        from: String,
        to: String,
        relationship: Relationship,
    },

    /// A concept cannot be deleted while edges or questions still reference it.
    #[error(
        "Concept {id} is still in use ({edges} edge(s), {questions} question(s)); unlink or reassign first"
    )]
    ConceptInUse {
        id: String,
        edges: u64,
        questions: u64,
    },

    /// The submitted grade does not match the recall outcome.
    #[error("Grade {grade} is not allowed after stage '{stage}' (allowed: {allowed})")]
    GradeMismatch {
        grade: u8,
        stage: RecallStage,
        allowed: String,
    },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
