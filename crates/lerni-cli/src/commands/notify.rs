//! Desktop reminders for due reviews.

use std::process::Command;

use anyhow::{Context, bail};
use lerni_config::LerniConfig;
use lerni_core::entities::Question;
use tracing::debug;

use crate::context::AppContext;
use crate::ui;

const TITLE: &str = "Lerni Review Reminder";
const PROMPT_PREVIEW_CHARS: usize = 30;

/// Handle `study notify`.
pub async fn handle(ctx: &AppContext) -> anyhow::Result<()> {
    if !ctx.config.notifications.enabled {
        ui::note("Notifications are disabled (notifications.enabled = false).");
        return Ok(());
    }

    let due = ctx.service.due(ctx.service.now(), None).await?;
    let Some(message) = message(&due) else {
        debug!("no questions due; skipping notification");
        return Ok(());
    };
    send(TITLE, &message)?;
    ui::note(&message);
    Ok(())
}

/// Handle `study notify --setup`: print a crontab line, touch no database.
pub fn setup(config: &LerniConfig) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("failed to locate the study binary")?;
    println!("{}", crontab_line(config, &exe.to_string_lossy())?);
    ui::note("Add the line above with `crontab -e`.");
    Ok(())
}

fn crontab_line(config: &LerniConfig, exe: &str) -> anyhow::Result<String> {
    let (hour, minute) = config.notifications.reminder_hour_minute()?;
    Ok(format!("{minute} {hour} * * * {exe} notify 2>/dev/null"))
}

fn message(due: &[Question]) -> Option<String> {
    match due {
        [] => None,
        [only] => Some(format!("1 question due: {}", preview(&only.prompt))),
        many => Some(format!("{} questions due for review", many.len())),
    }
}

fn preview(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn send(title: &str, message: &str) -> anyhow::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            escape_applescript(message),
            escape_applescript(title)
        );
        let mut command = Command::new("osascript");
        command.arg("-e").arg(script);
        command
    } else {
        let mut command = Command::new("notify-send");
        command.arg(title).arg(message);
        command
    };

    let status = command
        .status()
        .context("failed to run the desktop notifier")?;
    if !status.success() {
        bail!("desktop notifier exited with {status}");
    }
    Ok(())
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
