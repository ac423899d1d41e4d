//! Sample formats and byte order.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CafError;

/// Sample encodings this codec can frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Signed 16-bit integer PCM.
    Pcm16,
    /// Signed 24-bit integer PCM.
    Pcm24,
    /// Signed 32-bit integer PCM.
    Pcm32,
    /// 32-bit IEEE float.
    Float32,
    /// 64-bit IEEE float.
    Float64,
    /// 8-bit A-law.
    ALaw,
    /// 8-bit µ-law.
    ULaw,
}

impl SampleFormat {
    /// All supported formats.
    pub const ALL: [SampleFormat; 7] = [
        SampleFormat::Pcm16,
        SampleFormat::Pcm24,
        SampleFormat::Pcm32,
        SampleFormat::Float32,
        SampleFormat::Float64,
        SampleFormat::ALaw,
        SampleFormat::ULaw,
    ];

    /// Bytes occupied by one sample of one channel.
    pub fn byte_width(self) -> u32 {
        match self {
            SampleFormat::Pcm16 => 2,
            SampleFormat::Pcm24 => 3,
            SampleFormat::Pcm32 => 4,
            SampleFormat::Float32 => 4,
            SampleFormat::Float64 => 8,
            SampleFormat::ALaw | SampleFormat::ULaw => 1,
        }
    }

    /// Bits per channel as declared in the descriptor.
    pub fn bits_per_channel(self) -> u32 {
        self.byte_width() * 8
    }

    /// Returns true for the IEEE float formats.
    pub fn is_float(self) -> bool {
        matches!(self, SampleFormat::Float32 | SampleFormat::Float64)
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            SampleFormat::Pcm16 => "pcm16",
            SampleFormat::Pcm24 => "pcm24",
            SampleFormat::Pcm32 => "pcm32",
            SampleFormat::Float32 => "float32",
            SampleFormat::Float64 => "float64",
            SampleFormat::ALaw => "alaw",
            SampleFormat::ULaw => "ulaw",
        }
    }

    /// One-line description.
    pub fn description(self) -> &'static str {
        match self {
            SampleFormat::Pcm16 => "Signed 16 bit data",
            SampleFormat::Pcm24 => "Signed 24 bit data",
            SampleFormat::Pcm32 => "Signed 32 bit data",
            SampleFormat::Float32 => "32 bit float data",
            SampleFormat::Float64 => "64 bit float data",
            SampleFormat::ALaw => "A-Law",
            SampleFormat::ULaw => "U-Law",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = CafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "pcm16" | "pcm_16" | "s16" => Ok(SampleFormat::Pcm16),
            "pcm24" | "pcm_24" | "s24" => Ok(SampleFormat::Pcm24),
            "pcm32" | "pcm_32" | "s32" => Ok(SampleFormat::Pcm32),
            "float32" | "float" | "f32" => Ok(SampleFormat::Float32),
            "float64" | "double" | "f64" => Ok(SampleFormat::Float64),
            "alaw" | "a-law" => Ok(SampleFormat::ALaw),
            "ulaw" | "u-law" | "mulaw" => Ok(SampleFormat::ULaw),
            _ => Err(CafError::unsupported(format!(
                "unimplemented sample format '{}'",
                s
            ))),
        }
    }
}

/// Byte order of the samples in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl Endianness {
    /// The byte order of the CPU this code was compiled for.
    ///
    /// Falls back to big-endian on targets that are not little-endian.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            Endianness::Big => "big",
            Endianness::Little => "little",
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order requested by a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndianRequest {
    /// No preference; the native CPU order is used.
    #[default]
    File,
    /// Force little-endian.
    Little,
    /// Force big-endian.
    Big,
    /// Force the native CPU order.
    Cpu,
}

impl EndianRequest {
    /// Resolves the request to a concrete byte order.
    pub fn resolve(self) -> Endianness {
        match self {
            EndianRequest::Little => Endianness::Little,
            EndianRequest::Big => Endianness::Big,
            EndianRequest::File | EndianRequest::Cpu => Endianness::native(),
        }
    }
}

impl From<Endianness> for EndianRequest {
    fn from(endianness: Endianness) -> Self {
        match endianness {
            Endianness::Big => EndianRequest::Big,
            Endianness::Little => EndianRequest::Little,
        }
    }
}

impl FromStr for EndianRequest {
    type Err = CafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "default" => Ok(EndianRequest::File),
            "little" | "le" => Ok(EndianRequest::Little),
            "big" | "be" => Ok(EndianRequest::Big),
            "cpu" | "native" => Ok(EndianRequest::Cpu),
            _ => Err(CafError::invalid_param(
                "endian",
                format!("expected file, little, big or cpu, got '{}'", s),
            )),
        }
    }
}
