use anyhow::bail;
use lerni_db::updates::question::{QuestionMetaUpdate, QuestionMetaUpdateBuilder};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::MetaArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `study meta`.
pub async fn run(args: &MetaArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let update = meta_update(args);
    if update.is_empty() {
        bail!("nothing to change: pass --difficulty, --clear-difficulty, --add-source, or --remove-source");
    }

    let question = ctx.write(|| ctx.service.update_meta(&args.id, &update)).await?;
    output(&question, flags.format)
}

fn meta_update(args: &MetaArgs) -> QuestionMetaUpdate {
    let mut builder = QuestionMetaUpdateBuilder::new();
    if args.clear_difficulty {
        builder = builder.difficulty(None);
    } else if let Some(difficulty) = args.difficulty {
        builder = builder.difficulty(Some(difficulty));
    }
    for source in &args.add_sources {
        builder = builder.add_source(source);
    }
    for source in &args.remove_sources {
        builder = builder.remove_source(source);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args() -> MetaArgs {
        MetaArgs {
            id: "qst-1".into(),
            difficulty: None,
            clear_difficulty: false,
            add_sources: Vec::new(),
            remove_sources: Vec::new(),
        }
    }

    #[test]
    fn no_flags_is_empty_update() {
        assert!(meta_update(&args()).is_empty());
    }

    #[test]
    fn clear_difficulty_sets_explicit_none() {
        let update = meta_update(&MetaArgs {
            clear_difficulty: true,
            ..args()
        });
        assert_eq!(update.difficulty, Some(None));
    }

    #[test]
    fn sources_pass_through() {
        let update = meta_update(&MetaArgs {
            difficulty: Some(4),
            add_sources: vec!["SICP 1.3".into()],
            remove_sources: vec!["old blog".into()],
            ..args()
        });
        assert_eq!(update.difficulty, Some(Some(4)));
        assert_eq!(update.add_sources, vec!["SICP 1.3".to_string()]);
        assert_eq!(update.remove_sources, vec!["old blog".to_string()]);
    }
}
