use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `study` binary.
#[derive(Debug, Parser)]
#[command(name = "study", version, about = "Lerni - explain it, then remember it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding lerni.db (overrides general.data_dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            data_dir: self.data_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};

    use super::subcommands::{ConceptCommands, ReviewCommands};
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "study", "--format", "json", "--limit", "10", "--verbose", "today",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Today));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["study", "today", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Today));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["study", "--format", "xml", "today"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["study", "-q", "-v", "today"]).is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["study", "--data-dir", "/tmp/lerni", "today"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.data_dir, Some(PathBuf::from("/tmp/lerni")));
    }

    #[test]
    fn new_accepts_inline_fields() {
        let cli = Cli::try_parse_from([
            "study",
            "new",
            "What is a closure?",
            "--notes",
            "a function with captured state",
            "--final",
            "code plus environment",
            "-c",
            "Python",
            "-d",
            "3",
            "-s",
            "Fluent Python ch. 9",
        ])
        .expect("cli should parse");

        let Commands::New(args) = cli.command else {
            panic!("expected new");
        };
        assert_eq!(args.prompt.as_deref(), Some("What is a closure?"));
        assert_eq!(args.concept.as_deref(), Some("Python"));
        assert_eq!(args.difficulty, Some(3));
        assert_eq!(args.sources, vec!["Fluent Python ch. 9".to_string()]);
        assert_eq!(
            args.fields.final_explanation.as_deref(),
            Some("code plus environment")
        );
        assert!(!args.fields.is_empty());
    }

    #[test]
    fn difficulty_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["study", "new", "Q", "-d", "6"]).is_err());
    }

    #[test]
    fn grade_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["study", "review", "grade", "rev-1", "6"]).is_err());
        let cli = Cli::try_parse_from(["study", "review", "grade", "rev-1", "0"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Review {
                action: ReviewCommands::Grade { grade: 0, .. }
            }
        ));
    }

    #[test]
    fn review_start_takes_an_id_or_a_concept() {
        let cli = Cli::try_parse_from(["study", "review", "start"]).expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Review {
                action: ReviewCommands::Start {
                    question_id: None,
                    concept: None
                }
            }
        ));

        let cli = Cli::try_parse_from(["study", "review", "start", "--concept", "Rust"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Review {
                action: ReviewCommands::Start { concept: Some(ref c), .. }
            } if c == "Rust"
        ));

        assert!(
            Cli::try_parse_from(["study", "review", "start", "qst-1", "-c", "Rust"]).is_err()
        );
    }

    #[test]
    fn assign_requires_concept_or_none() {
        assert!(Cli::try_parse_from(["study", "assign", "qst-1"]).is_err());
        assert!(Cli::try_parse_from(["study", "assign", "qst-1", "Rust", "--none"]).is_err());
        assert!(Cli::try_parse_from(["study", "assign", "qst-1", "--none"]).is_ok());
    }

    #[test]
    fn concept_link_defaults_to_parent() {
        let cli = Cli::try_parse_from(["study", "concept", "link", "Decorators", "Python"])
            .expect("cli should parse");
        let Commands::Concept {
            action: ConceptCommands::Link { from, to, kind },
        } = cli.command
        else {
            panic!("expected concept link");
        };
        assert_eq!(from, "Decorators");
        assert_eq!(to, "Python");
        assert_eq!(
            lerni_core::enums::Relationship::from(kind),
            lerni_core::enums::Relationship::Parent
        );
    }
}
