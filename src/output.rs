use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::OutputFormat;

static FORMAT: AtomicU8 = AtomicU8::new(0);
static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_format(format: OutputFormat) {
    let value = match format {
        OutputFormat::Table => 0,
        OutputFormat::Json => 1,
        OutputFormat::Compact => 2,
    };
    FORMAT.store(value, Ordering::Relaxed);
}

pub fn format() -> OutputFormat {
    match FORMAT.load(Ordering::Relaxed) {
        1 => OutputFormat::Json,
        2 => OutputFormat::Compact,
        _ => OutputFormat::Table,
    }
}

pub fn is_json_output() -> bool {
    matches!(format(), OutputFormat::Json)
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Print a table, JSON, or one line per item depending on output mode
pub fn print_table<T, R, F, C>(items: &[T], to_row: F, to_compact: C)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
    C: Fn(&T) -> String,
{
    match format() {
        OutputFormat::Json => print_json(&items),
        OutputFormat::Compact => {
            for item in items {
                println!("{}", to_compact(item));
            }
        }
        OutputFormat::Table => {
            let rows: Vec<R> = items.iter().map(to_row).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
}

/// Print a table whose columns are only known at runtime
pub fn print_dynamic_table(header: Vec<String>, rows: Vec<Vec<String>>) {
    if matches!(format(), OutputFormat::Compact) {
        for row in rows {
            println!("{}", row.join(" | "));
        }
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        print_json(item);
    } else {
        display(item);
    }
}

pub fn print_json<T: Serialize + ?Sized>(item: &T) {
    println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
}

/// Print a message (skipped in quiet mode, or prints simple object)
pub fn print_message(message: &str) {
    if is_quiet() {
        return;
    }

    if is_json_output() {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{message}");
    }
}

/// Per-item batch progress on stderr, so stdout stays parseable
pub fn print_progress(completed: usize, total: usize, title: &str, ok: bool) {
    if is_quiet() || is_json_output() {
        return;
    }

    let marker = if ok { "✓".green() } else { "✗".red() };
    eprintln!("[{completed}/{total}] {marker} {}", truncate(title, 60));
}

pub fn success(text: &str) -> String {
    text.green().to_string()
}

pub fn failure(text: &str) -> String {
    text.red().bold().to_string()
}

pub fn dimmed(text: &str) -> String {
    text.bright_black().to_string()
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
