//! Hand-built CAF byte images.
//!
//! The builders here lay out every field by hand instead of going through
//! `cafkit-core`, so the tests check the codec against an independent
//! rendering of the on-disk format.

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Size of the file header plus a 32-byte `desc` chunk.
pub const DESC_END: usize = 8 + 12 + 32;

/// Descriptor field values for a fixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescFields {
    /// Frames per second, written as a big-endian f64.
    pub sample_rate: f64,
    /// Four-character format id such as `lpcm`, `ulaw` or `alaw`.
    pub format_id: [u8; 4],
    /// Bit 0 marks float samples, bit 1 little-endian samples.
    pub format_flags: u32,
    /// Bytes in one packet.
    pub bytes_per_packet: u32,
    /// Frames in one packet; 1 for uncompressed formats.
    pub frames_per_packet: u32,
    /// Channels in one frame.
    pub channels_per_frame: u32,
    /// Bits per sample of one channel.
    pub bits_per_channel: u32,
}

impl DescFields {
    /// 16-bit mono big-endian integer PCM at 44.1 kHz.
    pub fn pcm16_mono() -> Self {
        Self {
            sample_rate: 44100.0,
            format_id: *b"lpcm",
            format_flags: 0,
            bytes_per_packet: 2,
            frames_per_packet: 1,
            channels_per_frame: 1,
            bits_per_channel: 16,
        }
    }

    /// Same fields with different flags.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.format_flags = flags;
        self
    }

    /// Same fields with a different packet shape.
    pub fn with_shape(mut self, bytes_per_packet: u32, channels: u32, bits: u32) -> Self {
        self.bytes_per_packet = bytes_per_packet;
        self.channels_per_frame = channels;
        self.bits_per_channel = bits;
        self
    }

    /// Same fields with a different format id.
    pub fn with_format_id(mut self, format_id: &[u8; 4]) -> Self {
        self.format_id = *format_id;
        self
    }
}

/// Builder for a CAF byte image.
#[derive(Debug, Clone)]
pub struct CafImage {
    bytes: Vec<u8>,
}

impl CafImage {
    /// Starts an image with the `caff` marker, version 1 and flags 0.
    pub fn new() -> Self {
        Self::with_marker(b"caff")
    }

    /// Starts an image with an arbitrary marker.
    pub fn with_marker(marker: &[u8; 4]) -> Self {
        let mut bytes = Vec::new();
        // Offset 0x00-0x03: file marker
        bytes.extend_from_slice(marker);
        // Offset 0x04-0x05: version
        bytes.extend_from_slice(&1u16.to_be_bytes());
        // Offset 0x06-0x07: flags
        bytes.extend_from_slice(&0u16.to_be_bytes());
        Self { bytes }
    }

    /// Appends a chunk header with an explicit declared size.
    pub fn chunk_header(mut self, tag: &[u8; 4], size: i64) -> Self {
        self.bytes.extend_from_slice(tag);
        self.bytes.extend_from_slice(&size.to_be_bytes());
        self
    }

    /// Appends a complete chunk whose declared size matches `payload`.
    pub fn chunk(self, tag: &[u8; 4], payload: &[u8]) -> Self {
        let mut image = self.chunk_header(tag, payload.len() as i64);
        image.bytes.extend_from_slice(payload);
        image
    }

    /// Appends a `desc` chunk declaring `declared_size` bytes.
    ///
    /// Bytes beyond the 32-byte record are filled with `0xEE`; a declared size
    /// under 32 still writes the full record.
    pub fn desc_sized(self, fields: &DescFields, declared_size: i64) -> Self {
        let mut image = self.chunk_header(b"desc", declared_size);
        // +0x00: sample rate (f64 BE)
        image.bytes.extend_from_slice(&fields.sample_rate.to_be_bytes());
        // +0x08: format id
        image.bytes.extend_from_slice(&fields.format_id);
        // +0x0C: format flags
        image.bytes.extend_from_slice(&fields.format_flags.to_be_bytes());
        // +0x10: bytes per packet
        image.bytes.extend_from_slice(&fields.bytes_per_packet.to_be_bytes());
        // +0x14: frames per packet
        image.bytes.extend_from_slice(&fields.frames_per_packet.to_be_bytes());
        // +0x18: channels per frame
        image.bytes.extend_from_slice(&fields.channels_per_frame.to_be_bytes());
        // +0x1C: bits per channel
        image.bytes.extend_from_slice(&fields.bits_per_channel.to_be_bytes());

        if declared_size > 32 {
            let surplus = (declared_size - 32) as usize;
            image.bytes.extend(std::iter::repeat(0xEE).take(surplus));
        }
        image
    }

    /// Appends a standard 32-byte `desc` chunk.
    pub fn desc(self, fields: &DescFields) -> Self {
        self.desc_sized(fields, 32)
    }

    /// Appends a `data` chunk: edit count 1, then `samples`.
    pub fn data(self, samples: &[u8]) -> Self {
        let mut image = self.chunk_header(b"data", samples.len() as i64 + 4);
        image.bytes.extend_from_slice(&1u32.to_be_bytes());
        image.bytes.extend_from_slice(samples);
        image
    }

    /// Appends raw bytes.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Current length of the image.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Finishes the image.
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for CafImage {
    fn default() -> Self {
        Self::new()
    }
}

/// The reference scenario: PCM16 mono at 44.1 kHz with 2000 sample bytes.
pub fn scenario_pcm16_mono() -> Vec<u8> {
    CafImage::new()
        .desc(&DescFields::pcm16_mono())
        .data(&ramp(2000))
        .build()
}

/// `len` bytes counting up from zero and wrapping.
pub fn ramp(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// A temporary directory holding CAF files written by a test.
pub struct FileFixture {
    pub root: TempDir,
}

impl FileFixture {
    /// Creates an empty fixture directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        Self { root }
    }

    /// Path for a file named `name` inside the fixture.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Writes `bytes` to `name` and returns its path.
    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        let mut file = std::fs::File::create(&path).expect("Failed to create fixture file");
        file.write_all(bytes).expect("Failed to write fixture file");
        path
    }
}

impl Default for FileFixture {
    fn default() -> Self {
        Self::new()
    }
}
