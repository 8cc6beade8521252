use lerni_core::entities::AnswerFields;

use crate::cli::root_commands::AnswerFieldArgs;

/// Inline `--notes/--simple/--gaps/--final/--analogies` flags as a patch.
#[must_use]
pub fn answer_fields(args: &AnswerFieldArgs) -> AnswerFields {
    AnswerFields {
        raw_notes: args.notes.clone(),
        simple_explanation: args.simple.clone(),
        gaps_questions: args.gaps.clone(),
        final_explanation: args.final_explanation.clone(),
        analogies_examples: args.analogies.clone(),
    }
}
