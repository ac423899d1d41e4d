//! Container writer: header emission and finalization.
//!
//! A stream is written in two phases. [`CafWriter::create`] emits a
//! provisional header with a zero data length so the sample bytes can follow
//! it immediately; [`CafWriter::finalize`] rewrites the same header with the
//! real length once the samples are in place. The header always has the same
//! size, so the sample data never moves.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, WriteBytesExt};

use crate::chunk::{ChunkHeader, ChunkTag, FileHeader, CHUNK_HEADER_SIZE, FILE_HEADER_SIZE};
use crate::descriptor::{Descriptor, DESCRIPTOR_SIZE};
use crate::error::{CafError, CafResult};
use crate::log::{HeaderLog, LogLine};
use crate::reader::read_header;
use crate::session::{DataRegion, FormatSession, StreamInfo, WriteFormat};
use crate::store::ByteStore;

/// Size of the data chunk's edit count field.
pub const EDIT_COUNT_SIZE: u64 = 4;

/// Bytes written before the first sample: file header, `desc` chunk, and the
/// `data` chunk header with its edit count.
pub const HEADER_SIZE: u64 =
    FILE_HEADER_SIZE + CHUNK_HEADER_SIZE + DESCRIPTOR_SIZE + CHUNK_HEADER_SIZE + EDIT_COUNT_SIZE;

/// Edit count written into every data chunk.
const EDIT_COUNT: u32 = 1;

/// Staging area the header is assembled in before it reaches the store.
#[derive(Debug, Default)]
pub struct HeaderBuffer {
    bytes: Vec<u8>,
    descriptor: Option<Descriptor>,
}

impl HeaderBuffer {
    /// Creates a buffer sized for one header.
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(HEADER_SIZE as usize),
            descriptor: None,
        }
    }

    /// Assembles the header for `session` and returns its bytes.
    pub fn assemble(&mut self, session: &FormatSession) -> CafResult<&[u8]> {
        self.bytes.clear();

        let descriptor = Descriptor::encode(
            session.format(),
            session.channels(),
            session.endianness(),
            f64::from(session.sample_rate()),
        );
        let data_chunk_size = i64::try_from(session.data_length())
            .map_err(|_| CafError::invalid_param("data_length", "too large for a data chunk"))?;

        FileHeader::current().write_to(&mut self.bytes)?;
        ChunkHeader::new(ChunkTag::Desc, DESCRIPTOR_SIZE as i64).write_to(&mut self.bytes)?;
        descriptor.write_to(&mut self.bytes)?;
        ChunkHeader::new(ChunkTag::Data, data_chunk_size).write_to(&mut self.bytes)?;
        self.bytes.write_u32::<BigEndian>(EDIT_COUNT)?;

        self.descriptor = Some(descriptor);
        Ok(&self.bytes)
    }

    /// The most recently assembled header.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// The descriptor of the most recently assembled header.
    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }
}

/// An open CAF stream in write mode.
///
/// Dropping a writer that was not closed finalizes it on a best-effort basis;
/// use [`CafWriter::close`] to observe the result.
#[derive(Debug)]
pub struct CafWriter<W: Write + Seek> {
    store: W,
    session: FormatSession,
    buffer: HeaderBuffer,
    log: HeaderLog,
    logical_end: Option<u64>,
    auto_update: bool,
    broken: bool,
    closed: bool,
}

impl<W: Write + Seek> CafWriter<W> {
    /// Starts a new stream at the beginning of `store`.
    ///
    /// `store` must be empty: the data length is measured from the store at
    /// finalization, so leftover bytes would be counted as samples. Use
    /// [`CafWriter::append`] to continue an existing stream.
    ///
    /// The provisional header is written before this returns, leaving the
    /// cursor at the first sample byte.
    pub fn create(mut store: W, params: WriteFormat) -> CafResult<Self> {
        let session = FormatSession::for_write(&params)?;
        let existing = store.byte_len()?;
        if existing != 0 {
            return Err(CafError::invalid_param(
                "store",
                format!("holds {existing} bytes; a new stream needs an empty store"),
            ));
        }
        store.seek(SeekFrom::Start(0))?;

        let mut writer = Self::with_session(store, session, HeaderLog::new());
        writer.emit_provisional()?;
        writer.log_layout();

        tracing::debug!(
            format = %params.format,
            channels = params.channels,
            sample_rate = params.sample_rate,
            endianness = %writer.session.endianness(),
            "created CAF stream"
        );
        Ok(writer)
    }

    fn with_session(store: W, session: FormatSession, log: HeaderLog) -> Self {
        Self {
            store,
            session,
            buffer: HeaderBuffer::new(),
            log,
            logical_end: None,
            auto_update: false,
            broken: false,
            closed: false,
        }
    }

    fn log_layout(&mut self) {
        let Some(descriptor) = self.buffer.descriptor() else {
            return;
        };
        self.log.file_header(&FileHeader::current());
        self.log.descriptor(
            &ChunkHeader::new(ChunkTag::Desc, DESCRIPTOR_SIZE as i64),
            descriptor,
        );
    }

    /// The stream's format state.
    pub fn session(&self) -> &FormatSession {
        &self.session
    }

    /// A serializable summary.
    pub fn info(&self) -> StreamInfo {
        self.session.info()
    }

    /// Location of the sample bytes written so far.
    pub fn data_region(&self) -> DataRegion {
        DataRegion {
            offset: self.session.data_offset().unwrap_or(HEADER_SIZE),
            length: self.session.data_length(),
        }
    }

    /// Header diagnostics.
    pub fn log_lines(&self) -> &[LogLine] {
        self.log.lines()
    }

    /// Header diagnostics as text.
    pub fn log_text(&self) -> String {
        self.log.text()
    }

    /// Returns true once a header write has failed.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Appends raw sample bytes at the cursor.
    pub fn write_raw(&mut self, bytes: &[u8]) -> CafResult<()> {
        self.ensure_usable()?;
        self.store.write_all(bytes)?;

        let end = self.store.stream_position()?;
        let written = end.saturating_sub(self.data_region().offset);
        if written > self.session.data_length() {
            self.session.set_data_length(written);
        }

        if self.auto_update {
            self.finalize()?;
        }
        Ok(())
    }

    /// Writes the header for the current session state at offset zero.
    ///
    /// The cursor is left where it was, or at the first sample byte if it was
    /// inside the header.
    pub fn emit_provisional(&mut self) -> CafResult<()> {
        self.ensure_usable()?;
        let result = self.emit_header();
        if result.is_err() {
            self.broken = true;
        }
        result
    }

    fn emit_header(&mut self) -> CafResult<()> {
        let resume_at = self.store.stream_position()?;
        let header = self.buffer.assemble(&self.session)?;
        let header_len = header.len() as u64;

        self.store.seek(SeekFrom::Start(0))?;
        self.store.write_all(header)?;
        self.session.set_data_offset(header_len);

        self.store.seek(SeekFrom::Start(resume_at.max(header_len)))?;
        tracing::trace!(
            data_offset = header_len,
            data_length = self.session.data_length(),
            "header emitted"
        );
        Ok(())
    }

    /// Rewrites the header with the final data length.
    ///
    /// The length is measured from the store, so bytes written through other
    /// handles are counted. Calling this again without further writes
    /// produces the same bytes.
    pub fn finalize(&mut self) -> CafResult<()> {
        self.ensure_usable()?;
        let result = self.measure_and_emit();
        if result.is_err() {
            self.broken = true;
        }
        result
    }

    fn measure_and_emit(&mut self) -> CafResult<()> {
        self.store.flush()?;

        let store_length = self.store.byte_len()?;
        let data_offset = self.data_region().offset;
        let data_end = match self.logical_end {
            Some(end) if end < store_length => end,
            _ => store_length,
        };
        self.session
            .set_data_length(data_end.saturating_sub(data_offset));

        self.emit_header()?;
        self.store.flush()?;
        Ok(())
    }

    /// Rewrites the header now; same as [`CafWriter::finalize`].
    pub fn update_header(&mut self) -> CafResult<()> {
        self.finalize()
    }

    /// When enabled, the header is rewritten after every [`CafWriter::write_raw`].
    pub fn set_auto_update(&mut self, enabled: bool) {
        self.auto_update = enabled;
    }

    /// Records the cursor as the logical end of the sample data.
    ///
    /// Bytes past this point (for example trailing chunks written by the
    /// caller) are excluded from the data length at finalization.
    pub fn mark_data_end(&mut self) -> CafResult<u64> {
        let end = self.store.stream_position()?;
        self.logical_end = Some(end);
        Ok(end)
    }

    /// Finalizes the stream and releases the store.
    pub fn close(mut self) -> CafResult<()> {
        let result = if self.broken {
            Err(CafError::Broken)
        } else {
            self.finalize()
        };
        self.closed = true;
        result
    }

    fn ensure_usable(&self) -> CafResult<()> {
        if self.broken {
            return Err(CafError::Broken);
        }
        Ok(())
    }
}

impl<S: Read + Write + Seek> CafWriter<S> {
    /// Opens `store` for appending samples to an existing stream.
    ///
    /// An empty store gets a new stream described by `params`. Otherwise the
    /// existing header is parsed, `params` is ignored and the cursor is placed
    /// after the last sample byte. The existing data chunk must directly follow
    /// a 32-byte descriptor so the rewritten header lands on the same bytes.
    pub fn append(mut store: S, params: WriteFormat) -> CafResult<Self> {
        if store.byte_len()? == 0 {
            return Self::create(store, params);
        }

        let mut log = HeaderLog::new();
        let parsed = read_header(&mut store, &mut log)?;
        let region = parsed
            .session
            .data_region()
            .ok_or_else(|| CafError::structural("data region was not located"))?;
        if region.offset != HEADER_SIZE {
            return Err(CafError::unsupported(format!(
                "cannot append: sample data starts at offset {}, expected {}",
                region.offset, HEADER_SIZE
            )));
        }

        store.seek(SeekFrom::Start(region.end()))?;
        let mut writer = Self::with_session(store, parsed.session, log);
        writer.finalize()?;

        tracing::debug!(
            format = %writer.session.format(),
            data_length = region.length,
            "opened CAF stream for appending"
        );
        Ok(writer)
    }
}

impl<W: Write + Seek> Drop for CafWriter<W> {
    fn drop(&mut self) {
        if self.closed || self.broken {
            return;
        }
        if let Err(e) = self.finalize() {
            tracing::warn!(error = %e, "failed to finalize CAF stream on drop");
        }
    }
}
