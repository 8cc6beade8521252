//! External editor integration.
//!
//! The editor opens one temp file laid out as the explain-to-learn steps:
//!
//! ```text
//! # Lines starting with # are removed.
//! [prompt]
//! What are Python decorators?
//!
//! [raw_notes]
//! ...
//! ```
//!
//! Each `[section]` header starts a field. Sections left empty clear the
//! field; a missing section leaves it unchanged.

use std::io::Write;
use std::process::Command;

use anyhow::{Context, bail};
use lerni_config::LerniConfig;
use lerni_core::entities::{Answer, AnswerFields};
use lerni_core::enums::AnswerField;

const PROMPT_SECTION: &str = "prompt";

/// Text parsed back out of the editor.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub prompt: Option<String>,
    pub fields: AnswerFields,
}

/// Editor command: `general.editor`, then `$VISUAL`, then `$EDITOR`, then `vi`.
#[must_use]
pub fn resolve_editor(config: &LerniConfig) -> String {
    resolve_editor_from(config, |key| std::env::var(key).ok())
}

fn resolve_editor_from(config: &LerniConfig, env: impl Fn(&str) -> Option<String>) -> String {
    config
        .general
        .editor
        .clone()
        .or_else(|| env("VISUAL"))
        .or_else(|| env("EDITOR"))
        .filter(|editor| !editor.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Build the template. `prompt` adds an editable question section; `content`
/// pre-fills the answer sections.
#[must_use]
pub fn template(header: &str, prompt: Option<&str>, content: &AnswerFields) -> String {
    let mut out = comment_block(header);
    out.push_str("# Lines starting with # are removed. An empty section clears that field.\n\n");

    if let Some(prompt) = prompt {
        push_section(&mut out, PROMPT_SECTION, "The question shown during review", prompt);
    }
    for field in AnswerField::ALL {
        let body = field_text(content, field).unwrap_or_default();
        push_section(&mut out, field.as_str(), field.title(), body);
    }
    out
}

/// Every field of `answer` as a patch, for pre-filling the template.
#[must_use]
pub fn content_of(answer: &Answer) -> AnswerFields {
    let mut fields = AnswerFields::default();
    for field in AnswerField::ALL {
        if let Some(text) = answer.field(field) {
            fields.set(field, text);
        }
    }
    fields
}

fn field_text(fields: &AnswerFields, field: AnswerField) -> Option<&str> {
    match field {
        AnswerField::RawNotes => fields.raw_notes.as_deref(),
        AnswerField::SimpleExplanation => fields.simple_explanation.as_deref(),
        AnswerField::GapsQuestions => fields.gaps_questions.as_deref(),
        AnswerField::FinalExplanation => fields.final_explanation.as_deref(),
        AnswerField::AnalogiesExamples => fields.analogies_examples.as_deref(),
    }
}

fn comment_block(header: &str) -> String {
    let mut out = String::new();
    for line in header.lines() {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn push_section(out: &mut String, name: &str, title: &str, body: &str) {
    out.push_str(&format!("[{name}]\n# {title}\n"));
    if !body.is_empty() {
        out.push_str(body.trim_end());
        out.push('\n');
    }
    out.push('\n');
}

/// Parse an edited template. Unknown sections are an error so typos do not
/// silently drop text.
pub fn parse(text: &str) -> anyhow::Result<Draft> {
    let mut draft = Draft::default();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        if line.starts_with('#') {
            continue;
        }
        if let Some(name) = section_name(line) {
            if let Some((name, body)) = current.take() {
                apply(&mut draft, &name, &body)?;
            }
            current = Some((name.to_string(), Vec::new()));
            continue;
        }
        match current.as_mut() {
            Some((_, body)) => body.push(line),
            None if line.trim().is_empty() => {}
            None => bail!("text outside of any [section]: '{}'", line.trim()),
        }
    }
    if let Some((name, body)) = current {
        apply(&mut draft, &name, &body)?;
    }
    Ok(draft)
}

fn section_name(line: &str) -> Option<&str> {
    let name = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    (!name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')).then_some(name)
}

fn apply(draft: &mut Draft, name: &str, body: &[&str]) -> anyhow::Result<()> {
    let text = body.join("\n").trim().to_string();
    if name == PROMPT_SECTION {
        draft.prompt = Some(text);
        return Ok(());
    }
    let Some(field) = AnswerField::ALL.into_iter().find(|f| f.as_str() == name) else {
        bail!("unknown section [{name}]");
    };
    draft.fields.set(field, text);
    Ok(())
}

/// Open the editor on a sectioned template and parse the result.
pub fn edit(config: &LerniConfig, initial: &str) -> anyhow::Result<Draft> {
    parse(&open_editor(config, initial)?)
}

/// Open the editor on a blank page under `header` and return the text with
/// comment lines removed.
pub fn capture(config: &LerniConfig, header: &str) -> anyhow::Result<String> {
    let text = open_editor(config, &format!("{}\n", comment_block(header)))?;
    Ok(strip_comments(&text))
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn open_editor(config: &LerniConfig, initial: &str) -> anyhow::Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("lerni-")
        .suffix(".md")
        .tempfile()
        .context("failed to create temp file for editor")?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    let editor = resolve_editor(config);
    let mut parts = editor.split_whitespace();
    let program = parts.next().context("editor command is empty")?;
    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("failed to launch editor '{editor}'"))?;
    if !status.success() {
        bail!("editor '{editor}' exited with {status}; nothing saved");
    }

    std::fs::read_to_string(file.path()).context("failed to read edited file")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn answer() -> Answer {
        Answer {
            id: "ans-1".into(),
            question_id: "qst-1".into(),
            raw_notes: "closures capture\nvariables".into(),
            simple_explanation: Some("a function that remembers".into()),
            gaps_questions: None,
            final_explanation: None,
            analogies_examples: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn template_round_trips_through_parse() {
        let text = template("Editing qst-1", Some("What is a closure?"), &content_of(&answer()));
        let draft = parse(&text).unwrap();

        assert_eq!(draft.prompt.as_deref(), Some("What is a closure?"));
        assert_eq!(
            draft.fields.raw_notes.as_deref(),
            Some("closures capture\nvariables")
        );
        assert_eq!(
            draft.fields.simple_explanation.as_deref(),
            Some("a function that remembers")
        );
        assert_eq!(draft.fields.gaps_questions.as_deref(), Some(""));
    }

    #[test]
    fn comments_are_stripped_and_missing_sections_left_alone() {
        let draft = parse("# header\n[final_explanation]\n# hint\nthe real answer\n# trailing\n")
            .unwrap();
        assert_eq!(draft.prompt, None);
        assert_eq!(draft.fields.final_explanation.as_deref(), Some("the real answer"));
        assert_eq!(draft.fields.raw_notes, None);
    }

    #[test]
    fn capture_strips_header_comments() {
        assert_eq!(
            strip_comments("# Explain from memory\n# What is Pin?\n\nit stops moves\n"),
            "it stops moves"
        );
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = parse("[raw_note]\ntext\n").unwrap_err();
        assert!(err.to_string().contains("unknown section [raw_note]"));
    }

    #[test]
    fn stray_text_is_rejected() {
        assert!(parse("hello\n[raw_notes]\nx\n").is_err());
    }

    #[test]
    fn editor_precedence() {
        let mut config = LerniConfig::default();
        let env = |key: &str| match key {
            "VISUAL" => Some("code --wait".to_string()),
            "EDITOR" => Some("nano".to_string()),
            _ => None,
        };
        assert_eq!(resolve_editor_from(&config, env), "code --wait");
        assert_eq!(
            resolve_editor_from(&config, |k| (k == "EDITOR").then(|| "nano".to_string())),
            "nano"
        );
        assert_eq!(resolve_editor_from(&config, |_| None), "vi");

        config.general.editor = Some("hx".into());
        assert_eq!(resolve_editor_from(&config, env), "hx");
    }

    #[cfg(unix)]
    #[test]
    fn edit_reads_back_file_after_editor_exits() {
        let mut config = LerniConfig::default();
        config.general.editor = Some("true".into());
        let draft = edit(&config, "[raw_notes]\nunchanged\n").unwrap();
        assert_eq!(draft.fields.raw_notes.as_deref(), Some("unchanged"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_editor_aborts() {
        let mut config = LerniConfig::default();
        config.general.editor = Some("false".into());
        assert!(edit(&config, "[raw_notes]\nx\n").is_err());
    }
}
