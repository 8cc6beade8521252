//! Plain-text tables for the `table` output format.

use std::borrow::Cow;

const GAP: &str = "  ";
const MIN_COLUMN: usize = 6;

/// Layout options resolved from the terminal.
#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Debug)]
struct Column {
    width: usize,
    floor: usize,
    align: Align,
}

/// Render `rows` under `headers`, one line per row.
///
/// Columns holding only numbers (intervals, counts, easiness) are right
/// aligned. Missing cells print as `-`. With `options.color`, review stages
/// and statuses are colored.
#[must_use]
pub fn render(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut columns = measure(headers, rows);
    if let Some(limit) = options.max_width {
        shrink(&mut columns, limit);
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(&columns, headers.iter().copied(), false));
    lines.push("-".repeat(total_width(&columns)));
    for row in rows {
        let cells = (0..columns.len()).map(|index| row.get(index).map_or("-", String::as_str));
        lines.push(line(&columns, cells, options.color));
    }
    lines.join("\n")
}

fn measure(headers: &[&str], rows: &[Vec<String>]) -> Vec<Column> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let cells = || rows.iter().filter_map(move |row| row.get(index));
            let widest = cells().map(|cell| cell.chars().count()).max().unwrap_or(0);
            let floor = header.chars().count().max(MIN_COLUMN);
            let numeric = cells().next().is_some() && cells().all(|cell| is_number(cell));
            Column {
                width: widest.max(floor),
                floor,
                align: if numeric { Align::Right } else { Align::Left },
            }
        })
        .collect()
}

fn total_width(columns: &[Column]) -> usize {
    let gaps = GAP.len() * columns.len().saturating_sub(1);
    columns.iter().map(|column| column.width).sum::<usize>() + gaps
}

/// Take one character at a time from the widest column until the table fits
/// or every column is at its floor.
fn shrink(columns: &mut [Column], limit: usize) {
    let mut excess = total_width(columns).saturating_sub(limit);
    while excess > 0 {
        let Some(widest) = columns
            .iter_mut()
            .filter(|column| column.width > column.floor)
            .max_by_key(|column| column.width)
        else {
            break;
        };
        widest.width -= 1;
        excess -= 1;
    }
}

fn line<'a>(columns: &[Column], cells: impl Iterator<Item = &'a str>, color: bool) -> String {
    columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| {
            let padded = pad(&clip(cell, column.width), column);
            match tone(cell).filter(|_| color) {
                Some(code) => format!("\u{1b}[{code}m{padded}\u{1b}[0m"),
                None => padded,
            }
        })
        .collect::<Vec<_>>()
        .join(GAP)
}

fn clip(text: &str, width: usize) -> Cow<'_, str> {
    if text.chars().count() <= width {
        return Cow::Borrowed(text);
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    Cow::Owned(format!("{kept}…"))
}

fn pad(text: &str, column: &Column) -> String {
    let width = column.width;
    match column.align {
        Align::Left => format!("{text:<width$}"),
        Align::Right => format!("{text:>width$}"),
    }
}

fn is_number(cell: &str) -> bool {
    cell.parse::<f64>().is_ok_and(f64::is_finite)
}

/// ANSI color for review stages and statuses.
fn tone(cell: &str) -> Option<&'static str> {
    match cell {
        "completed" | "recalled" => Some("32"),
        "awaiting_recall" | "pending" | "skipped" => Some("33"),
        "failed" => Some("31"),
        _ => None,
    }
}
