use clap::{Subcommand, ValueEnum};
use lerni_core::enums::Relationship;

/// Edge kind as accepted on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RelationshipArg {
    Parent,
    Prerequisite,
    Related,
}

impl From<RelationshipArg> for Relationship {
    fn from(value: RelationshipArg) -> Self {
        match value {
            RelationshipArg::Parent => Self::Parent,
            RelationshipArg::Prerequisite => Self::Prerequisite,
            RelationshipArg::Related => Self::Related,
        }
    }
}

/// Concept commands. Concepts are referenced by id, name, or alias.
#[derive(Clone, Debug, Subcommand)]
pub enum ConceptCommands {
    /// Create a concept.
    New {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Alternative name (repeatable).
        #[arg(short, long = "alias")]
        aliases: Vec<String>,
        /// Place the new concept under this parent.
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// List concepts.
    List {
        /// Only concepts without a parent.
        #[arg(long, conflicts_with = "search")]
        roots: bool,
        /// Case-insensitive substring match on name and aliases.
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a concept with its neighbors.
    Show { concept: String },
    /// Add an edge FROM -> TO ("FROM has parent TO", "FROM requires TO").
    Link {
        from: String,
        to: String,
        #[arg(short, long, value_enum, default_value = "parent")]
        kind: RelationshipArg,
    },
    /// Remove an edge.
    Unlink {
        from: String,
        to: String,
        #[arg(short, long, value_enum, default_value = "parent")]
        kind: RelationshipArg,
    },
    /// Delete a concept with no edges and no questions.
    Delete { concept: String },
    /// Walk the graph upward (or downward with --descendants), nearest first.
    Ancestors {
        concept: String,
        #[arg(short, long, value_enum, default_value = "parent")]
        kind: RelationshipArg,
        #[arg(long)]
        descendants: bool,
    },
}
