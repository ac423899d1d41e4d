//! Format session state shared by the reader and the writer.

use serde::Serialize;

use crate::error::{CafError, CafResult};
use crate::format::{EndianRequest, Endianness, SampleFormat};

/// Maximum number of channels accepted for writing.
pub const MAX_CHANNELS: u32 = 1024;

/// Location of the raw sample bytes within the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataRegion {
    /// Offset of the first sample byte.
    pub offset: u64,
    /// Number of sample bytes.
    pub length: u64,
}

impl DataRegion {
    /// Offset one past the last sample byte.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Parameters for a stream being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFormat {
    /// Sample encoding.
    pub format: SampleFormat,
    /// Number of channels.
    pub channels: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Requested byte order.
    pub endian: EndianRequest,
}

impl WriteFormat {
    /// Creates write parameters with the default byte order.
    pub fn new(format: SampleFormat, channels: u32, sample_rate: u32) -> Self {
        Self {
            format,
            channels,
            sample_rate,
            endian: EndianRequest::File,
        }
    }

    /// Mono stream.
    pub fn mono(format: SampleFormat, sample_rate: u32) -> Self {
        Self::new(format, 1, sample_rate)
    }

    /// Stereo stream.
    pub fn stereo(format: SampleFormat, sample_rate: u32) -> Self {
        Self::new(format, 2, sample_rate)
    }

    /// Sets the requested byte order.
    pub fn with_endian(mut self, endian: impl Into<EndianRequest>) -> Self {
        self.endian = endian.into();
        self
    }

    /// Checks the parameters before any header is emitted.
    pub fn validate(&self) -> CafResult<()> {
        if self.channels == 0 {
            return Err(CafError::invalid_param("channels", "must be at least 1"));
        }
        if self.channels > MAX_CHANNELS {
            return Err(CafError::invalid_param(
                "channels",
                format!("{} exceeds the maximum of {}", self.channels, MAX_CHANNELS),
            ));
        }
        if self.sample_rate == 0 {
            return Err(CafError::invalid_param("sample_rate", "must be positive"));
        }
        Ok(())
    }
}

/// The mutable descriptor of one open stream.
///
/// `byte_width` and `frame_count` are always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSession {
    sample_rate: u32,
    channels: u32,
    format: SampleFormat,
    endianness: Endianness,
    data_offset: Option<u64>,
    data_length: u64,
}

impl FormatSession {
    /// Creates session state with no data region yet.
    pub fn new(
        sample_rate: u32,
        channels: u32,
        format: SampleFormat,
        endianness: Endianness,
    ) -> Self {
        Self {
            sample_rate,
            channels,
            format,
            endianness,
            data_offset: None,
            data_length: 0,
        }
    }

    /// Creates session state for a stream about to be written.
    pub fn for_write(params: &WriteFormat) -> CafResult<Self> {
        params.validate()?;
        Ok(Self::new(
            params.sample_rate,
            params.channels,
            params.format,
            params.endian.resolve(),
        ))
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Sample encoding.
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Byte order of the samples.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Bytes per sample per channel.
    pub fn byte_width(&self) -> u32 {
        self.format.byte_width()
    }

    /// Bytes per sample frame.
    pub fn frame_width(&self) -> u64 {
        u64::from(self.byte_width()) * u64::from(self.channels)
    }

    /// Offset of the first sample byte, once located.
    pub fn data_offset(&self) -> Option<u64> {
        self.data_offset
    }

    /// Number of sample bytes.
    pub fn data_length(&self) -> u64 {
        self.data_length
    }

    /// Number of whole frames in the data region.
    ///
    /// A partial trailing frame is not counted.
    pub fn frame_count(&self) -> u64 {
        match self.frame_width() {
            0 => 0,
            width => self.data_length / width,
        }
    }

    /// The sample region, once located.
    pub fn data_region(&self) -> Option<DataRegion> {
        self.data_offset.map(|offset| DataRegion {
            offset,
            length: self.data_length,
        })
    }

    /// Records where the sample data starts.
    ///
    /// # Panics
    /// Panics if the offset was already set to a different value; the data
    /// region never moves once located.
    pub(crate) fn set_data_offset(&mut self, offset: u64) {
        if let Some(existing) = self.data_offset {
            assert_eq!(
                existing, offset,
                "data offset is fixed once located and cannot be relocated"
            );
        }
        self.data_offset = Some(offset);
    }

    pub(crate) fn set_data_length(&mut self, length: u64) {
        self.data_length = length;
    }

    /// A serializable snapshot.
    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            sample_rate: self.sample_rate,
            channels: self.channels,
            format: self.format,
            endianness: self.endianness,
            frames: self.frame_count(),
            data_offset: self.data_offset.unwrap_or(0),
            data_length: self.data_length,
            duration_seconds: self.duration_seconds(),
        }
    }

    /// Duration of the whole frames in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// Summary of an open stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u32,
    /// Sample encoding.
    pub format: SampleFormat,
    /// Byte order of the samples.
    pub endianness: Endianness,
    /// Number of whole frames.
    pub frames: u64,
    /// Offset of the first sample byte.
    pub data_offset: u64,
    /// Number of sample bytes.
    pub data_length: u64,
    /// Duration in seconds.
    pub duration_seconds: f64,
}
