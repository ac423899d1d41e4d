//! Formats command implementation

use anyhow::Result;
use cafkit_core::SampleFormat;
use colored::Colorize;
use std::process::ExitCode;

/// Run the formats command
pub fn run() -> Result<ExitCode> {
    println!("{}", "Supported sample formats:".cyan().bold());
    for format in SampleFormat::ALL {
        println!(
            "  {:<8} {:>2} byte(s)  {}",
            format.name().green(),
            format.byte_width(),
            format.description()
        );
    }
    Ok(ExitCode::SUCCESS)
}
