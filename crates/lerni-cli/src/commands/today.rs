use lerni_core::responses::TodaySummary;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::rows::output_questions;
use crate::context::AppContext;
use crate::output::output;

/// Handle `study today`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let summary = ctx
        .service
        .today(ctx.service.now(), ctx.config.review.lookahead_days)
        .await?;

    match flags.format {
        OutputFormat::Table => print_tables(&summary, flags),
        OutputFormat::Json | OutputFormat::Raw => output(&summary, flags.format),
    }
}

fn print_tables(summary: &TodaySummary, flags: &GlobalFlags) -> anyhow::Result<()> {
    println!("{}", headline(summary));
    println!();
    println!("Due now ({}):", summary.due.len());
    output_questions(&summary.due, flags.format)?;
    println!();
    println!(
        "Upcoming in the next {} days ({}):",
        summary.lookahead_days,
        summary.upcoming.len()
    );
    output_questions(&summary.upcoming, flags.format)
}

fn headline(summary: &TodaySummary) -> String {
    let stats = &summary.stats;
    format!(
        "{} questions, {} due, {} uncategorized",
        stats.total, stats.due, stats.uncategorized
    )
}
