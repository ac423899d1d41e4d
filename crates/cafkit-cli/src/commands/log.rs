//! Log command implementation
//!
//! Prints the header parse log of a CAF file, including files that fail to open.

use anyhow::{Context, Result};
use cafkit_core::inspect_header;
use colored::Colorize;
use std::fs::File;
use std::process::ExitCode;

/// Run the log command
///
/// # Returns
/// Exit code: 0 if the header parsed, 1 otherwise
pub fn run(path: &str) -> Result<ExitCode> {
    tracing::debug!(path, "running log");
    let mut file = File::open(path).with_context(|| format!("Failed to open file: {}", path))?;
    let (log, result) = inspect_header(&mut file);

    print!("{}", log.text());

    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            println!("{} [{}] {}", "!!".red(), e.code(), e);
            Ok(ExitCode::from(1))
        }
    }
}
