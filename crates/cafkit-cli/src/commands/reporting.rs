use anyhow::{Context, Result};
use cafkit_core::{open_path, CafReader};
use colored::Colorize;
use std::fs::File;

/// Opens `path` for reading, attaching the path to any error.
pub(crate) fn open_reader(path: &str) -> Result<CafReader<File>> {
    open_path(path).with_context(|| format!("Failed to open CAF file: {}", path))
}

/// Prints the bold heading shown above each report.
pub(crate) fn print_heading(title: &str, path: &str) {
    println!("{} {}", title.cyan().bold(), path);
}

/// Prints one aligned `label: value` row.
pub(crate) fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<14} {}", format!("{}:", label).dimmed(), value);
}

/// Serializes `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    println!("{}", text);
    Ok(())
}
