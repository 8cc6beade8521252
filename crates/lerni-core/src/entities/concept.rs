use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Relationship;

/// A node in the knowledge graph. Can be broad ("Python") or narrow ("Decorators").
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Concept {
    pub id: String,
    /// Canonical name, unique case-insensitively.
    pub name: String,
    pub aliases: BTreeSet<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Concept {
    /// Case-insensitive match against the name or any alias.
    #[must_use]
    pub fn matches_name(&self, reference: &str) -> bool {
        self.name.eq_ignore_ascii_case(reference)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(reference))
    }
}

/// A typed, directed relationship between two concepts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConceptEdge {
    pub from_id: String,
    pub to_id: String,
    pub relationship: Relationship,
}
