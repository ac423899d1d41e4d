//! Per-stream header diagnostics.
//!
//! Every open stream keeps the lines describing what its header parser or
//! writer saw. Each line is also emitted as a `tracing` event with structured
//! fields; the in-memory copy is what `log_text()` hands back to callers.

use crate::chunk::{ChunkHeader, FileHeader};
use crate::descriptor::Descriptor;

/// Severity of a header log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Plain description of a parsed or written field.
    Info,
    /// Inconsistent input that was not fatal by itself.
    Warning,
}

/// One header log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Severity.
    pub level: LogLevel,
    /// Human-readable text.
    pub text: String,
}

/// Ordered diagnostics collected while parsing or writing one header.
#[derive(Debug, Clone, Default)]
pub struct HeaderLog {
    lines: Vec<LogLine>,
}

impl HeaderLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded lines.
    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    /// Returns the log as newline-terminated text.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if line.level == LogLevel::Warning {
                out.push_str("**** ");
            }
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }

    /// Returns true if any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        self.lines.iter().any(|l| l.level == LogLevel::Warning)
    }

    /// Records an informational line.
    pub fn info(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(target: "cafkit::header", "{}", text);
        self.lines.push(LogLine {
            level: LogLevel::Info,
            text,
        });
    }

    /// Records a warning.
    pub fn warn(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(target: "cafkit::header", "{}", text);
        self.lines.push(LogLine {
            level: LogLevel::Warning,
            text,
        });
    }

    pub(crate) fn file_header(&mut self, header: &FileHeader) {
        tracing::debug!(
            marker = %header.marker,
            version = header.version,
            flags = header.flags,
            "file header"
        );
        self.push_quiet(format!("{}", header.marker));
        self.push_quiet(format!("  Version : {}", header.version));
        self.push_quiet(format!("  Flags   : {:x}", header.flags));
    }

    pub(crate) fn descriptor(&mut self, header: &ChunkHeader, desc: &Descriptor) {
        tracing::debug!(
            size = header.size,
            sample_rate = desc.sample_rate,
            format_id = %desc.format_id,
            format_flags = desc.format_flags,
            bytes_per_packet = desc.bytes_per_packet,
            frames_per_packet = desc.frames_per_packet,
            channels_per_frame = desc.channels_per_frame,
            bits_per_channel = desc.bits_per_channel,
            "descriptor chunk"
        );
        self.push_quiet(format!("{} : {}", header.tag, header.size));
        self.push_quiet(format!("  Sample rate      : {:5.3}", desc.sample_rate));
        self.push_quiet(format!("  Format id        : {}", desc.format_id));
        self.push_quiet(format!("  Format flags     : {:x}", desc.format_flags));
        self.push_quiet(format!("  Bytes / packet   : {}", desc.bytes_per_packet));
        self.push_quiet(format!("  Frames / packet  : {}", desc.frames_per_packet));
        self.push_quiet(format!("  Channels / frame : {}", desc.channels_per_frame));
        self.push_quiet(format!("  Bits / channel   : {}", desc.bits_per_channel));
    }

    pub(crate) fn chunk(&mut self, header: &ChunkHeader, offset: u64) {
        tracing::debug!(tag = %header.tag, size = header.size, offset, "chunk");
        self.push_quiet(format!("{} : {}", header.tag, header.size));
    }

    pub(crate) fn skipped_chunk(&mut self, header: &ChunkHeader, offset: u64) {
        tracing::debug!(tag = %header.tag, size = header.size, offset, "skipping chunk");
        self.push_quiet(format!(" {} : {} (skipped)", header.tag, header.size));
    }

    pub(crate) fn edit_count(&mut self, edit_count: u32) {
        tracing::debug!(edit_count, "data chunk edit count");
        self.push_quiet(format!("  edit : {}", edit_count));
    }

    /// Records a line whose structured event was already emitted by the caller.
    fn push_quiet(&mut self, text: String) {
        self.lines.push(LogLine {
            level: LogLevel::Info,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_marks_warnings() {
        let mut log = HeaderLog::new();
        log.info("caff");
        log.warn("chunk size too small");
        assert_eq!(log.text(), "caff\n**** chunk size too small\n");
        assert!(log.has_warnings());
    }

    #[test]
    fn test_empty_log() {
        let log = HeaderLog::new();
        assert!(log.lines().is_empty());
        assert!(!log.has_warnings());
        assert_eq!(log.text(), "");
    }
}
