//! Chunks command implementation
//!
//! Lists every chunk in a CAF file with its absolute offset.

use anyhow::{Context, Result};
use cafkit_core::{list_chunks, ChunkEntry};
use colored::Colorize;
use std::fs::File;
use std::process::ExitCode;

use super::reporting::{print_heading, print_json};

/// Run the chunks command
///
/// # Arguments
/// * `path` - Path to the CAF file
/// * `json` - Emit machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(path: &str, json: bool) -> Result<ExitCode> {
    tracing::debug!(path, json, "running chunks");
    let mut file = File::open(path).with_context(|| format!("Failed to open file: {}", path))?;
    let entries =
        list_chunks(&mut file).with_context(|| format!("Failed to walk chunks: {}", path))?;
    tracing::debug!(count = entries.len(), "chunk walk finished");

    if json {
        print_json(&entries)?;
        return Ok(ExitCode::SUCCESS);
    }

    print_heading("Chunks:", path);
    println!(
        "  {:<6} {:>12} {:>12}",
        "tag".bold(),
        "offset".bold(),
        "size".bold()
    );
    for entry in &entries {
        println!("  {}", format_row(entry));
    }
    println!("  {} chunk(s)", entries.len());

    Ok(ExitCode::SUCCESS)
}

fn format_row(entry: &ChunkEntry) -> String {
    let size = if entry.size < 0 {
        "to EOF".to_string()
    } else {
        entry.size.to_string()
    };
    format!("{:<6} {:>12} {:>12}", entry.tag.to_string(), entry.offset, size)
}
