//! Output formatting helpers for the `xyzplot` CLI.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use xyzplot_engine::Warning;

use crate::styles::{ICON_WARN, render_warn};

/// Longest cell text shown for a JSON value in tables.
const MAX_CELL_WIDTH: usize = 60;

/// Print a value as pretty JSON on stdout.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Broken pipes (piped to `head`) are not errors.
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a simple table with headers and rows.
///
/// Columns are padded to their widest cell and separated by two spaces.
/// Nothing is printed for an empty row set.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = write!(handle, "{}", format_table(headers, rows));
}

fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: Vec<String>| {
        let last = cells.len().saturating_sub(1);
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            if i == last {
                out.push_str(cell);
            } else {
                out.push_str(&format!("{:<width$}", cell, width = widths[i]));
            }
        }
        out.push('\n');
    };

    push_line(headers.iter().map(|h| h.to_string()).collect());
    push_line(widths.iter().map(|w| "-".repeat(*w)).collect());
    for row in rows {
        push_line(row.clone());
    }
    out
}

/// Print warnings to stderr, one per line.
pub fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{} {}", render_warn(ICON_WARN), warning);
    }
}

/// Compact single-line rendering of a JSON value for table cells.
///
/// Strings are shown without quotes; long values are cut with `...`.
pub fn display_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate(&text, MAX_CELL_WIDTH)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
