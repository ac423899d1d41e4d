//! Info command implementation
//!
//! Prints the stream summary of a CAF file.

use anyhow::{Context, Result};
use cafkit_core::StreamInfo;
use serde::Serialize;
use std::process::ExitCode;

use super::reporting::{open_reader, print_field, print_heading, print_json};

#[derive(Debug, Serialize)]
struct InfoReport {
    path: String,
    #[serde(flatten)]
    info: StreamInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_hash: Option<String>,
}

/// Run the info command
///
/// # Arguments
/// * `path` - Path to the CAF file
/// * `json` - Emit machine-readable JSON
/// * `hash` - Include the BLAKE3 digest of the sample region
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(path: &str, json: bool, hash: bool) -> Result<ExitCode> {
    tracing::debug!(path, json, hash, "running info");
    let mut reader = open_reader(path)?;

    let data_hash = if hash {
        Some(
            reader
                .data_hash()
                .with_context(|| format!("Failed to hash sample data: {}", path))?,
        )
    } else {
        None
    };

    let report = InfoReport {
        path: path.to_string(),
        info: reader.info(),
        data_hash,
    };

    if json {
        print_json(&report)?;
        return Ok(ExitCode::SUCCESS);
    }

    print_heading("File:", path);
    let info = &report.info;
    print_field("Format", format!("{} ({})", info.format, info.format.description()));
    print_field("Channels", info.channels);
    print_field("Sample rate", info.sample_rate);
    print_field("Endianness", info.endianness);
    print_field("Frames", info.frames);
    print_field("Duration", format!("{:.3} s", info.duration_seconds));
    print_field("Data offset", info.data_offset);
    print_field("Data length", info.data_length);
    if let Some(ref digest) = report.data_hash {
        print_field("Data hash", digest);
    }

    Ok(ExitCode::SUCCESS)
}
