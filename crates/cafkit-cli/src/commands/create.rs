//! Create command implementation
//!
//! Writes a CAF file holding silent frames in the requested format.

use anyhow::{Context, Result};
use cafkit_core::{create_path, EndianRequest, SampleFormat, WriteFormat};
use colored::Colorize;
use std::process::ExitCode;

/// Frames written per `write_raw` call.
const FRAMES_PER_BLOCK: u64 = 4096;

/// Options for the create command.
#[derive(Debug, Clone)]
pub struct CreateOptions<'a> {
    /// Output path.
    pub path: &'a str,
    /// Sample format name (see `cafkit formats`).
    pub format: &'a str,
    /// Number of channels.
    pub channels: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of silent frames to write.
    pub frames: u64,
    /// Byte order name: file, little, big or cpu.
    pub endian: &'a str,
}

/// Run the create command
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(options: &CreateOptions<'_>) -> Result<ExitCode> {
    let params = parse_params(options)?;
    tracing::debug!(
        path = options.path,
        format = %params.format,
        channels = params.channels,
        frames = options.frames,
        "running create"
    );

    let mut writer = create_path(options.path, params)
        .with_context(|| format!("Failed to create CAF file: {}", options.path))?;

    let frame_width = u64::from(params.format.byte_width()) * u64::from(params.channels);
    let block = vec![0u8; (frame_width * FRAMES_PER_BLOCK.min(options.frames.max(1))) as usize];

    let mut remaining = options.frames;
    while remaining > 0 {
        let frames = remaining.min(FRAMES_PER_BLOCK);
        writer
            .write_raw(&block[..(frames * frame_width) as usize])
            .with_context(|| format!("Failed to write samples: {}", options.path))?;
        remaining -= frames;
    }

    let info = writer.info();
    writer
        .close()
        .with_context(|| format!("Failed to finalize CAF file: {}", options.path))?;

    println!(
        "{} Wrote {} frame(s) of {} x {} @ {} Hz ({}) to {}",
        "SUCCESS".green().bold(),
        options.frames,
        info.format,
        info.channels,
        info.sample_rate,
        info.endianness,
        options.path
    );
    Ok(ExitCode::SUCCESS)
}

fn parse_params(options: &CreateOptions<'_>) -> Result<WriteFormat> {
    let format: SampleFormat = options
        .format
        .parse()
        .with_context(|| format!("Unknown sample format: {}", options.format))?;
    let endian: EndianRequest = options
        .endian
        .parse()
        .with_context(|| format!("Unknown byte order: {}", options.endian))?;

    let params = WriteFormat::new(format, options.channels, options.sample_rate).with_endian(endian);
    params.validate()?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafkit_core::{open_path, Endianness};
    use tempfile::tempdir;

    fn options<'a>(path: &'a str, format: &'a str, frames: u64) -> CreateOptions<'a> {
        CreateOptions {
            path,
            format,
            channels: 2,
            sample_rate: 22050,
            frames,
            endian: "little",
        }
    }

    #[test]
    fn test_create_writes_requested_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silence.caf");
        let path = path.to_str().unwrap();

        run(&options(path, "pcm24", 5000)).unwrap();

        let reader = open_path(path).unwrap();
        assert_eq!(reader.session().frame_count(), 5000);
        assert_eq!(reader.session().endianness(), Endianness::Little);
        assert_eq!(reader.session().channels(), 2);
    }

    #[test]
    fn test_create_zero_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.caf");
        let path = path.to_str().unwrap();

        run(&options(path, "ulaw", 0)).unwrap();
        assert_eq!(open_path(path).unwrap().session().frame_count(), 0);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = parse_params(&options("unused.caf", "ima4", 1)).unwrap_err();
        assert!(err.to_string().contains("ima4"));
    }
}
