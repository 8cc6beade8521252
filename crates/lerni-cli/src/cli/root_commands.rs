use clap::{Args, Subcommand};

use crate::cli::subcommands::{ConceptCommands, ReviewCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create a question and its first answer.
    New(NewArgs),
    /// Fix the current answer in place (forks if it was already reviewed).
    Edit(AnswerArgs),
    /// Record a new answer version.
    Snapshot(AnswerArgs),
    /// Show a question with its current answer.
    Show { id: String },
    /// List every answer version of a question, oldest first.
    History { id: String },
    /// Delete a question with its answers and reviews.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Assign a question to a concept, or clear it with --none.
    Assign(AssignArgs),
    /// Change difficulty or source references.
    Meta(MetaArgs),
    /// List questions.
    List(ListArgs),
    /// Search question prompts.
    Search(SearchArgs),
    /// Due reviews, upcoming reviews, and totals.
    Today,
    /// Two-stage review sessions.
    Review {
        #[command(subcommand)]
        action: ReviewCommands,
    },
    /// Concepts and the relationships between them.
    Concept {
        #[command(subcommand)]
        action: ConceptCommands,
    },
    /// Send a desktop reminder for due reviews.
    Notify(NotifyArgs),
}

/// Answer fields given inline. Any field given bypasses the editor.
#[derive(Clone, Debug, Default, Args)]
pub struct AnswerFieldArgs {
    /// Step 1: everything you know.
    #[arg(long)]
    pub notes: Option<String>,
    /// Step 2: explain it to a beginner.
    #[arg(long)]
    pub simple: Option<String>,
    /// Step 3: what you could not explain.
    #[arg(long)]
    pub gaps: Option<String>,
    /// Step 4: the refined explanation.
    #[arg(long = "final")]
    pub final_explanation: Option<String>,
    /// Analogies and examples.
    #[arg(long)]
    pub analogies: Option<String>,
}

impl AnswerFieldArgs {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.notes.is_none()
            && self.simple.is_none()
            && self.gaps.is_none()
            && self.final_explanation.is_none()
            && self.analogies.is_none()
    }
}

/// Arguments for `study new`.
#[derive(Clone, Debug, Args)]
pub struct NewArgs {
    /// The question shown during review.
    pub prompt: Option<String>,
    /// Concept id, name, or alias.
    #[arg(short, long)]
    pub concept: Option<String>,
    /// Difficulty from 1 to 5.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub difficulty: Option<u8>,
    /// Source reference (repeatable).
    #[arg(short, long = "source")]
    pub sources: Vec<String>,
    #[command(flatten)]
    pub fields: AnswerFieldArgs,
}

/// Arguments for `study edit` and `study snapshot`.
#[derive(Clone, Debug, Args)]
pub struct AnswerArgs {
    pub id: String,
    #[command(flatten)]
    pub fields: AnswerFieldArgs,
}

/// Arguments for `study assign`.
#[derive(Clone, Debug, Args)]
pub struct AssignArgs {
    pub id: String,
    /// Concept id, name, or alias.
    #[arg(required_unless_present = "none", conflicts_with = "none")]
    pub concept: Option<String>,
    /// Remove the question from its concept.
    #[arg(long)]
    pub none: bool,
}

/// Arguments for `study meta`.
#[derive(Clone, Debug, Args)]
pub struct MetaArgs {
    pub id: String,
    /// Difficulty from 1 to 5.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5), conflicts_with = "clear_difficulty")]
    pub difficulty: Option<u8>,
    /// Remove the difficulty rating.
    #[arg(long)]
    pub clear_difficulty: bool,
    /// Add a source reference (repeatable).
    #[arg(long = "add-source")]
    pub add_sources: Vec<String>,
    /// Remove a source reference (repeatable).
    #[arg(long = "remove-source")]
    pub remove_sources: Vec<String>,
}

/// Arguments for `study list`.
#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// Only questions in this concept (id, name, or alias).
    #[arg(short, long, conflicts_with = "uncategorized")]
    pub concept: Option<String>,
    /// Only questions without a concept.
    #[arg(long)]
    pub uncategorized: bool,
    /// Only questions due now, including the concept's whole subtree.
    #[arg(long)]
    pub due: bool,
}

/// Arguments for `study search`.
#[derive(Clone, Debug, Args)]
pub struct SearchArgs {
    pub query: String,
}

/// Arguments for `study notify`.
#[derive(Clone, Debug, Args)]
pub struct NotifyArgs {
    /// Print a crontab line for a daily reminder instead of notifying.
    #[arg(long)]
    pub setup: bool,
}
