//! The `desc` chunk and its mapping to [`SampleFormat`].
//!
//! The on-disk record is 32 bytes: a big-endian f64 sample rate, a four-byte
//! format identifier, then five big-endian u32 fields.
//!
//! Decoding runs an ordered rule table. Each rule looks at the raw fields and
//! either matches a format, rejects the record outright, or passes to the next
//! rule. Format identifiers alone are ambiguous (`lpcm` covers both integer and
//! float data), so the order of the table matters.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::chunk::FourCc;
use crate::format::{Endianness, SampleFormat};
use crate::log::HeaderLog;

/// Size of the encoded descriptor record.
pub const DESCRIPTOR_SIZE: u64 = 32;

/// Linear PCM, integer or float.
pub const LPCM: FourCc = FourCc(*b"lpcm");
/// A-law.
pub const ALAW: FourCc = FourCc(*b"alaw");
/// µ-law.
pub const ULAW: FourCc = FourCc(*b"ulaw");

/// Format flag bits.
pub mod format_flags {
    /// Samples are IEEE floats.
    pub const IS_FLOAT: u32 = 0x1;
    /// Samples are little-endian.
    pub const IS_LITTLE_ENDIAN: u32 = 0x2;
}

/// The raw descriptor record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Descriptor {
    /// Sample frames per second.
    pub sample_rate: f64,
    /// Encoding identifier.
    pub format_id: FourCc,
    /// Encoding flags, see [`format_flags`].
    pub format_flags: u32,
    /// Bytes in one packet.
    pub bytes_per_packet: u32,
    /// Sample frames in one packet.
    pub frames_per_packet: u32,
    /// Channels in one frame.
    pub channels_per_frame: u32,
    /// Bits per sample of one channel.
    pub bits_per_channel: u32,
}

impl Descriptor {
    /// Builds the record describing `format` (the inverse of [`decode`]).
    ///
    /// Every format is framed as one sample frame per packet.
    pub fn encode(
        format: SampleFormat,
        channels: u32,
        endianness: Endianness,
        sample_rate: f64,
    ) -> Self {
        let mut flags = 0;
        if endianness == Endianness::Little {
            flags |= format_flags::IS_LITTLE_ENDIAN;
        }
        if format.is_float() {
            flags |= format_flags::IS_FLOAT;
        }

        let format_id = match format {
            SampleFormat::ALaw => ALAW,
            SampleFormat::ULaw => ULAW,
            _ => LPCM,
        };

        Self {
            sample_rate,
            format_id,
            format_flags: flags,
            bytes_per_packet: format.byte_width() * channels,
            frames_per_packet: 1,
            channels_per_frame: channels,
            bits_per_channel: format.bits_per_channel(),
        }
    }

    /// Byte order declared by the flags, independent of the encoding.
    pub fn endianness(&self) -> Endianness {
        if self.format_flags & format_flags::IS_LITTLE_ENDIAN != 0 {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    fn is_float(&self) -> bool {
        self.format_flags & format_flags::IS_FLOAT != 0
    }

    fn packet_holds(&self, bytes_per_sample: u32) -> bool {
        u64::from(self.bytes_per_packet)
            == u64::from(bytes_per_sample) * u64::from(self.channels_per_frame)
    }

    /// Reads the 32-byte record.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let sample_rate = reader.read_f64::<BigEndian>()?;
        let format_id = FourCc::read_from(reader)?;
        let format_flags = reader.read_u32::<BigEndian>()?;
        let bytes_per_packet = reader.read_u32::<BigEndian>()?;
        let frames_per_packet = reader.read_u32::<BigEndian>()?;
        let channels_per_frame = reader.read_u32::<BigEndian>()?;
        let bits_per_channel = reader.read_u32::<BigEndian>()?;

        Ok(Self {
            sample_rate,
            format_id,
            format_flags,
            bytes_per_packet,
            frames_per_packet,
            channels_per_frame,
            bits_per_channel,
        })
    }

    /// Writes the 32-byte record.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_f64::<BigEndian>(self.sample_rate)?;
        self.format_id.write_to(writer)?;
        writer.write_u32::<BigEndian>(self.format_flags)?;
        writer.write_u32::<BigEndian>(self.bytes_per_packet)?;
        writer.write_u32::<BigEndian>(self.frames_per_packet)?;
        writer.write_u32::<BigEndian>(self.channels_per_frame)?;
        writer.write_u32::<BigEndian>(self.bits_per_channel)?;
        Ok(())
    }
}

/// Result of evaluating one decode rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The record describes this format.
    Match(SampleFormat),
    /// The record is inconsistent; stop without a match.
    Reject(&'static str),
    /// This rule does not apply; try the next one.
    Continue,
}

/// A named decode rule.
pub struct DecodeRule {
    /// Rule name, for diagnostics.
    pub name: &'static str,
    /// Evaluates the rule.
    pub apply: fn(&Descriptor) -> RuleOutcome,
}

/// The decode table, evaluated top to bottom.
pub const DECODE_RULES: &[DecodeRule] = &[
    DecodeRule {
        name: "lpcm float",
        apply: rule_lpcm_float,
    },
    DecodeRule {
        name: "float flag consistency",
        apply: rule_float_flag_consistency,
    },
    DecodeRule {
        name: "lpcm integer",
        apply: rule_lpcm_integer,
    },
    DecodeRule {
        name: "companded",
        apply: rule_companded,
    },
];

fn rule_lpcm_float(desc: &Descriptor) -> RuleOutcome {
    if desc.format_id != LPCM || !desc.is_float() {
        return RuleOutcome::Continue;
    }
    match desc.bits_per_channel {
        32 if desc.packet_holds(4) => RuleOutcome::Match(SampleFormat::Float32),
        64 if desc.packet_holds(8) => RuleOutcome::Match(SampleFormat::Float64),
        _ => RuleOutcome::Continue,
    }
}

fn rule_float_flag_consistency(desc: &Descriptor) -> RuleOutcome {
    if desc.is_float() {
        RuleOutcome::Reject("'desc' chunk suggests float data, but other info invalid")
    } else {
        RuleOutcome::Continue
    }
}

fn rule_lpcm_integer(desc: &Descriptor) -> RuleOutcome {
    if desc.format_id != LPCM {
        return RuleOutcome::Continue;
    }
    match desc.bits_per_channel {
        32 if desc.packet_holds(4) => RuleOutcome::Match(SampleFormat::Pcm32),
        24 if desc.packet_holds(3) => RuleOutcome::Match(SampleFormat::Pcm24),
        16 if desc.packet_holds(2) => RuleOutcome::Match(SampleFormat::Pcm16),
        _ => RuleOutcome::Continue,
    }
}

fn rule_companded(desc: &Descriptor) -> RuleOutcome {
    if desc.bits_per_channel != 8 {
        return RuleOutcome::Continue;
    }
    if desc.format_id == ALAW {
        RuleOutcome::Match(SampleFormat::ALaw)
    } else if desc.format_id == ULAW {
        RuleOutcome::Match(SampleFormat::ULaw)
    } else {
        RuleOutcome::Continue
    }
}

/// Maps a descriptor record to a sample format.
///
/// Returns `None` when no rule matches; a rejecting rule records its reason as
/// a warning in `log`.
pub fn decode(desc: &Descriptor, log: &mut HeaderLog) -> Option<SampleFormat> {
    for rule in DECODE_RULES {
        match (rule.apply)(desc) {
            RuleOutcome::Match(format) => {
                tracing::trace!(rule = rule.name, %format, "descriptor matched");
                return Some(format);
            }
            RuleOutcome::Reject(reason) => {
                log.warn(format!("Ooops, {}.", reason));
                return None;
            }
            RuleOutcome::Continue => {}
        }
    }
    None
}
