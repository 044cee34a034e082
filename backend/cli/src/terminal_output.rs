//! Terminal output utilities: notes, table rendering and trigger result formatting.

use chatline_triggers::{SuggestionState, TriggerResult};
use serde_json::Value;

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// A message that left through the chat handle.
pub fn note_sent(msg: &str) {
    if supports_color() {
        println!("{DIM}→ {msg}{RESET}");
    } else {
        println!("SENT: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Render a left-aligned table; visible width ignores ANSI codes.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(strip_ansi(cell).chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().zip(&widths).map(|(h, w)| pad_cell(h, *w)).collect();
    out.push_str(&format!("  {}\n", header.join("  ").trim_end()));

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}\n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad_cell(row.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ").trim_end()));
    }

    out
}

fn pad_cell(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(strip_ansi(s).chars().count());
    format!("{s}{}", " ".repeat(pad))
}

// ---------------------------------------------------------------------------
// Trigger output
// ---------------------------------------------------------------------------

/// Error text plus whatever help the result carries.
pub fn render_failure(result: &TriggerResult) -> String {
    let mut lines = vec![result.error.clone().unwrap_or_else(|| "Failed".to_string())];
    let data = result.data.as_ref();

    if let Some(usage) = data.and_then(|d| d.get("usage")).and_then(Value::as_str) {
        let name = data.and_then(|d| d.get("commandName")).and_then(Value::as_str);
        match name {
            Some(name) if !usage.starts_with('/') => lines.push(format!("Usage: /{name} {usage}")),
            _ => lines.push(format!("Usage: {usage}")),
        }
    }

    let examples = data
        .and_then(|d| d.get("examples"))
        .and_then(Value::as_array)
        .map(|examples| examples.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    if !examples.is_empty() {
        lines.push("Examples:".to_string());
        for example in examples {
            lines.push(format!("  {example}"));
        }
    }

    lines.join("\n")
}

pub fn render_suggestions(state: &SuggestionState) -> String {
    match state {
        SuggestionState::Closed => "(no suggestions)".to_string(),
        SuggestionState::Failed { error, .. } => error.clone(),
        SuggestionState::Ready { items, .. } => {
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|item| {
                    vec![item.completion().to_string(), item.aliases.join(", "), item.description.clone()]
                })
                .collect();
            render_table(&["Completion", "Aliases", "Description"], &rows)
        }
    }
}
