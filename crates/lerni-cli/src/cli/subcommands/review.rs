use clap::Subcommand;

/// Review session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ReviewCommands {
    /// Open a review for a question (or resume its pending one). Shows the prompt only.
    ///
    /// Without a question id, picks the question that has been due longest.
    Start {
        question_id: Option<String>,
        /// Only pick from questions under this concept (id, name, or alias).
        #[arg(short, long, conflicts_with = "question_id")]
        concept: Option<String>,
    },
    /// You explained it from memory. Reveals the answer; grade 3-5 next.
    Recall {
        review_id: String,
        /// Your attempt. Opens the editor when omitted.
        #[arg(short, long)]
        explanation: Option<String>,
    },
    /// You could not recall it. Reveals the answer; grade 0-2 next.
    Forget {
        review_id: String,
        #[arg(short, long)]
        explanation: Option<String>,
        /// What you were missing.
        #[arg(short, long)]
        gaps: Option<String>,
    },
    /// Grade the review and reschedule the question.
    Grade {
        review_id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        grade: u8,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Push a question back without grading it.
    Skip { question_id: String },
    /// Show one review.
    Show { review_id: String },
    /// List reviews of a question, newest first.
    List { question_id: String },
}
