//! Container reader: header parsing and access to the sample region.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::chunk::{
    skip_payload, ChunkHeader, ChunkTag, FileHeader, CAFF_MARKER, CHUNK_HEADER_SIZE,
};
use crate::descriptor::{self, Descriptor, DESCRIPTOR_SIZE};
use crate::error::{truncated, CafError, CafResult};
use crate::log::{HeaderLog, LogLine};
use crate::session::{DataRegion, FormatSession, StreamInfo};
use crate::store::ByteStore;

/// Everything learned from a CAF header.
#[derive(Debug)]
pub(crate) struct ParsedHeader {
    pub file_header: FileHeader,
    pub descriptor: Descriptor,
    pub session: FormatSession,
}

/// Parser states. Each state carries what the earlier states produced.
enum ReadState {
    AwaitFileMarker,
    AwaitDescriptor {
        file_header: FileHeader,
    },
    ScanChunks {
        file_header: FileHeader,
        descriptor: Descriptor,
    },
    Done {
        file_header: FileHeader,
        descriptor: Descriptor,
        data_offset: u64,
    },
}

/// Parses the header of a CAF stream, leaving the cursor at the first sample byte.
pub(crate) fn read_header<S: Read + Seek>(
    store: &mut S,
    log: &mut HeaderLog,
) -> CafResult<ParsedHeader> {
    let file_length = store.byte_len()?;
    store.seek(SeekFrom::Start(0))?;

    let mut state = ReadState::AwaitFileMarker;
    let (file_header, descriptor, data_offset) = loop {
        state = match state {
            ReadState::AwaitFileMarker => {
                let file_header =
                    FileHeader::read_from(store).map_err(|e| truncated(e, "file header", 0))?;
                log.file_header(&file_header);
                if file_header.marker != CAFF_MARKER {
                    return Err(CafError::structural_at(
                        format!("not a CAF file (marker {})", file_header.marker),
                        0,
                    ));
                }
                ReadState::AwaitDescriptor { file_header }
            }

            ReadState::AwaitDescriptor { file_header } => {
                let descriptor = read_descriptor_chunk(store, log)?;
                ReadState::ScanChunks {
                    file_header,
                    descriptor,
                }
            }

            ReadState::ScanChunks {
                file_header,
                descriptor,
            } => {
                let position = store.stream_position()?;
                if position.saturating_add(CHUNK_HEADER_SIZE) > file_length {
                    log.warn("Error, could not find 'data' chunk.");
                    return Err(CafError::structural_at("no 'data' chunk found", position));
                }

                let header = ChunkHeader::read_from(store)
                    .map_err(|e| truncated(e, "chunk header", position))?;

                match header.tag {
                    ChunkTag::Data => {
                        log.chunk(&header, position);
                        let edit_count = store
                            .read_u32::<BigEndian>()
                            .map_err(|e| truncated(e, "data chunk edit count", position))?;
                        log.edit_count(edit_count);
                        ReadState::Done {
                            file_header,
                            descriptor,
                            data_offset: store.stream_position()?,
                        }
                    }
                    _ => {
                        log.skipped_chunk(&header, position);
                        skip_payload(store, &header, position)?;
                        ReadState::ScanChunks {
                            file_header,
                            descriptor,
                        }
                    }
                }
            }

            ReadState::Done {
                file_header,
                descriptor,
                data_offset,
            } => break (file_header, descriptor, data_offset),
        };
    };
    log.info("End");

    let session = session_from_descriptor(&descriptor, data_offset, file_length, log)?;

    Ok(ParsedHeader {
        file_header,
        descriptor,
        session,
    })
}

/// Reads the mandatory `desc` chunk that follows the file header.
fn read_descriptor_chunk<S: Read + Seek>(
    store: &mut S,
    log: &mut HeaderLog,
) -> CafResult<Descriptor> {
    let position = store.stream_position()?;
    let header = ChunkHeader::read_from(store)
        .map_err(|e| truncated(e, "descriptor chunk header", position))?;

    if header.tag != ChunkTag::Desc {
        return Err(CafError::structural_at(
            format!("expected 'desc' chunk, found '{}'", header.tag),
            position,
        ));
    }

    if header.size < DESCRIPTOR_SIZE as i64 {
        log.warn(format!(
            "Chunk size too small. Should be > {} bytes.",
            DESCRIPTOR_SIZE
        ));
        return Err(CafError::structural_at(
            format!(
                "'desc' chunk declares {} bytes, need at least {}",
                header.size, DESCRIPTOR_SIZE
            ),
            position,
        ));
    }

    let descriptor = Descriptor::read_from(store)
        .map_err(|e| truncated(e, "descriptor", position + CHUNK_HEADER_SIZE))?;
    log.descriptor(&header, &descriptor);

    let surplus = header.size - DESCRIPTOR_SIZE as i64;
    if surplus > 0 {
        store.seek(SeekFrom::Current(surplus))?;
    }

    Ok(descriptor)
}

/// Builds the session state from a decoded descriptor and the located data chunk.
fn session_from_descriptor(
    descriptor: &Descriptor,
    data_offset: u64,
    file_length: u64,
    log: &mut HeaderLog,
) -> CafResult<FormatSession> {
    let rate = descriptor.sample_rate;
    if !rate.is_finite() || rate.round() < 1.0 || rate.round() > f64::from(u32::MAX) {
        return Err(CafError::structural(format!("invalid sample rate {}", rate)));
    }
    if descriptor.channels_per_frame == 0 {
        return Err(CafError::structural("descriptor declares zero channels"));
    }

    let endianness = descriptor.endianness();
    let format = descriptor::decode(descriptor, log).ok_or_else(|| {
        CafError::unsupported(format!(
            "format id '{}', flags {:#x}, {} bits per channel, {} bytes per packet",
            descriptor.format_id,
            descriptor.format_flags,
            descriptor.bits_per_channel,
            descriptor.bytes_per_packet
        ))
    })?;

    let mut session = FormatSession::new(
        rate.round() as u32,
        descriptor.channels_per_frame,
        format,
        endianness,
    );
    session.set_data_offset(data_offset);
    session.set_data_length(file_length.saturating_sub(data_offset));
    Ok(session)
}

/// Parses the header of `store` without keeping a reader.
///
/// The diagnostics are returned even when parsing fails, so callers can show
/// how far the parser got.
pub fn inspect_header<S: Read + Seek>(store: &mut S) -> (HeaderLog, CafResult<StreamInfo>) {
    let mut log = HeaderLog::new();
    let result = read_header(store, &mut log).map(|parsed| parsed.session.info());
    (log, result)
}

/// An open CAF stream in read mode.
///
/// The cursor stays inside the sample region: reads stop at its end and frame
/// seeks are bounded by it.
#[derive(Debug)]
pub struct CafReader<R> {
    store: R,
    file_header: FileHeader,
    descriptor: Descriptor,
    session: FormatSession,
    region: DataRegion,
    log: HeaderLog,
}

impl<R: Read + Seek> CafReader<R> {
    /// Parses the header of `store` and positions the cursor at the first sample.
    ///
    /// On failure the store is dropped and no partial reader is returned.
    pub fn open(mut store: R) -> CafResult<Self> {
        let mut log = HeaderLog::new();
        let parsed = read_header(&mut store, &mut log)?;
        let region = parsed
            .session
            .data_region()
            .ok_or_else(|| CafError::structural("data region was not located"))?;

        tracing::debug!(
            format = %parsed.session.format(),
            channels = parsed.session.channels(),
            sample_rate = parsed.session.sample_rate(),
            data_offset = region.offset,
            data_length = region.length,
            "opened CAF stream for reading"
        );

        Ok(Self {
            store,
            file_header: parsed.file_header,
            descriptor: parsed.descriptor,
            session: parsed.session,
            region,
            log,
        })
    }

    /// The stream's format state.
    pub fn session(&self) -> &FormatSession {
        &self.session
    }

    /// A serializable summary.
    pub fn info(&self) -> StreamInfo {
        self.session.info()
    }

    /// Location of the sample bytes.
    pub fn data_region(&self) -> DataRegion {
        self.region
    }

    /// The raw descriptor record.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// The file header.
    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    /// Header parse diagnostics, in the order they were recorded.
    pub fn log_lines(&self) -> &[LogLine] {
        self.log.lines()
    }

    /// Header parse diagnostics as text, one line per entry.
    pub fn log_text(&self) -> String {
        self.log.text()
    }

    /// Reads raw sample bytes, never past the end of the sample region.
    ///
    /// Returns the number of bytes read; `0` at the end of the region.
    pub fn read_raw(&mut self, buf: &mut [u8]) -> CafResult<usize> {
        let position = self.store.stream_position()?;
        if position < self.region.offset {
            self.store.seek(SeekFrom::Start(self.region.offset))?;
        }
        let position = position.max(self.region.offset);
        let remaining = self.region.end().saturating_sub(position);
        let want = (buf.len() as u64).min(remaining) as usize;

        let mut filled = 0;
        while filled < want {
            match self.store.read(&mut buf[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    /// Moves the cursor to the start of `frame`.
    ///
    /// Seeking to the frame count (one past the last frame) is allowed.
    pub fn seek_frame(&mut self, frame: u64) -> CafResult<u64> {
        let frames = self.session.frame_count();
        if frame > frames {
            return Err(CafError::invalid_param(
                "frame",
                format!("{} is past the last frame ({})", frame, frames),
            ));
        }
        let offset = self.region.offset + frame * self.session.frame_width();
        self.store.seek(SeekFrom::Start(offset))?;
        Ok(frame)
    }

    /// Index of the frame the cursor is on.
    pub fn frame_position(&mut self) -> CafResult<u64> {
        let position = self.store.stream_position()?;
        let into_region = position.saturating_sub(self.region.offset);
        Ok(into_region / self.session.frame_width())
    }

    /// BLAKE3 hex digest of the whole sample region.
    ///
    /// The cursor position is preserved.
    pub fn data_hash(&mut self) -> CafResult<String> {
        let position = self.store.stream_position()?;
        self.store.seek(SeekFrom::Start(self.region.offset))?;

        let mut hasher = blake3::Hasher::new();
        let copied = io::copy(&mut (&mut self.store).take(self.region.length), &mut hasher)?;
        self.store.seek(SeekFrom::Start(position))?;

        if copied != self.region.length {
            return Err(CafError::structural_at(
                "sample region shorter than the file length implies",
                self.region.offset + copied,
            ));
        }
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Returns the underlying store.
    pub fn into_inner(self) -> R {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::FourCc;
    use crate::descriptor::LPCM;
    use crate::format::{Endianness, SampleFormat};
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    fn build(
        desc_size: i64,
        descriptor: &Descriptor,
        extra_chunks: &[(&[u8; 4], &[u8])],
        samples: &[u8],
    ) -> Vec<u8> {
        let mut file = Vec::new();
        FileHeader::current().write_to(&mut file).unwrap();
        ChunkHeader::new(ChunkTag::Desc, desc_size).write_to(&mut file).unwrap();
        descriptor.write_to(&mut file).unwrap();
        if desc_size > DESCRIPTOR_SIZE as i64 {
            file.extend(std::iter::repeat(0xAA).take((desc_size - DESCRIPTOR_SIZE as i64) as usize));
        }
        for (tag, payload) in extra_chunks {
            ChunkHeader::new(ChunkTag::from_fourcc(FourCc(**tag)), payload.len() as i64)
                .write_to(&mut file)
                .unwrap();
            file.write_all(payload).unwrap();
        }
        ChunkHeader::new(ChunkTag::Data, samples.len() as i64 + 4)
            .write_to(&mut file)
            .unwrap();
        file.write_all(&1u32.to_be_bytes()).unwrap();
        file.write_all(samples).unwrap();
        file
    }

    fn pcm16_mono() -> Descriptor {
        Descriptor::encode(SampleFormat::Pcm16, 1, Endianness::Big, 44100.0)
    }

    #[test]
    fn test_open_minimal_pcm16() {
        let file = build(32, &pcm16_mono(), &[], &[0u8; 2000]);
        let reader = CafReader::open(Cursor::new(file)).unwrap();

        assert_eq!(reader.session().format(), SampleFormat::Pcm16);
        assert_eq!(reader.session().channels(), 1);
        assert_eq!(reader.session().sample_rate(), 44100);
        assert_eq!(reader.session().endianness(), Endianness::Big);
        assert_eq!(reader.session().frame_count(), 1000);
        assert_eq!(
            reader.data_region(),
            DataRegion {
                offset: 68,
                length: 2000
            }
        );
    }

    #[test]
    fn test_skips_unknown_and_free_chunks() {
        let file = build(
            32,
            &pcm16_mono(),
            &[
                (b"free", &[0u8; 10][..]),
                (b"zzzz", &[1u8, 2, 3][..]),
                (b"info", &[0u8; 4][..]),
            ],
            &[0u8; 8],
        );
        let reader = CafReader::open(Cursor::new(file)).unwrap();
        assert_eq!(reader.data_region().offset, 68 + 22 + 15 + 16);
        assert_eq!(reader.data_region().length, 8);
        assert!(reader.log_text().contains("zzzz : 3 (skipped)"));
    }

    #[test]
    fn test_oversized_descriptor_is_skipped() {
        let file = build(40, &pcm16_mono(), &[], &[0u8; 4]);
        let reader = CafReader::open(Cursor::new(file)).unwrap();
        assert_eq!(reader.data_region().offset, 76);
        assert_eq!(reader.data_region().length, 4);
    }

    #[test]
    fn test_short_descriptor_is_structural() {
        let file = build(24, &pcm16_mono(), &[], &[0u8; 4]);
        let err = CafReader::open(Cursor::new(file)).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_wrong_marker_is_structural() {
        let mut file = build(32, &pcm16_mono(), &[], &[0u8; 4]);
        file[0..4].copy_from_slice(b"RIFF");
        assert!(CafReader::open(Cursor::new(file)).unwrap_err().is_structural());
    }

    #[test]
    fn test_first_chunk_must_be_desc() {
        let mut file = Vec::new();
        FileHeader::current().write_to(&mut file).unwrap();
        ChunkHeader::new(ChunkTag::Free, 0).write_to(&mut file).unwrap();
        file.extend_from_slice(&[0u8; 64]);
        assert!(CafReader::open(Cursor::new(file)).unwrap_err().is_structural());
    }

    #[test]
    fn test_missing_data_chunk() {
        let mut file = build(32, &pcm16_mono(), &[], &[]);
        file.truncate(52);
        ChunkHeader::new(ChunkTag::Free, 16).write_to(&mut file).unwrap();
        file.extend_from_slice(&[0u8; 16]);

        let err = CafReader::open(Cursor::new(file)).unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn test_truncated_descriptor() {
        let mut file = build(32, &pcm16_mono(), &[], &[]);
        file.truncate(30);
        assert!(CafReader::open(Cursor::new(file)).unwrap_err().is_structural());
    }

    #[test]
    fn test_float_flag_with_wrong_shape_is_unsupported() {
        let mut d = pcm16_mono();
        d.format_flags = 1;
        let file = build(32, &d, &[], &[0u8; 4]);
        let err = CafReader::open(Cursor::new(file)).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_little_endian_flag() {
        let mut d = pcm16_mono();
        d.format_flags = 2;
        let reader = CafReader::open(Cursor::new(build(32, &d, &[], &[0u8; 2000]))).unwrap();
        assert_eq!(reader.session().endianness(), Endianness::Little);
        assert_eq!(reader.session().frame_count(), 1000);
    }

    #[test]
    fn test_zero_channels_is_structural() {
        let d = Descriptor {
            sample_rate: 44100.0,
            format_id: LPCM,
            format_flags: 0,
            bytes_per_packet: 0,
            frames_per_packet: 1,
            channels_per_frame: 0,
            bits_per_channel: 16,
        };
        let err = CafReader::open(Cursor::new(build(32, &d, &[], &[]))).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_nan_sample_rate_is_structural() {
        let mut d = pcm16_mono();
        d.sample_rate = f64::NAN;
        let err = CafReader::open(Cursor::new(build(32, &d, &[], &[]))).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_sample_rate_is_rounded() {
        let mut d = pcm16_mono();
        d.sample_rate = 22049.6;
        let reader = CafReader::open(Cursor::new(build(32, &d, &[], &[]))).unwrap();
        assert_eq!(reader.session().sample_rate(), 22050);
    }

    #[test]
    fn test_read_raw_stops_at_region_end() {
        let samples: Vec<u8> = (0..10).collect();
        let mut reader =
            CafReader::open(Cursor::new(build(32, &pcm16_mono(), &[], &samples))).unwrap();

        let mut buf = [0u8; 6];
        assert_eq!(reader.read_raw(&mut buf).unwrap(), 6);
        assert_eq!(buf, [0, 1, 2, 3, 4, 5]);
        assert_eq!(reader.read_raw(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[6, 7, 8, 9]);
        assert_eq!(reader.read_raw(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_seek_frame() {
        let samples: Vec<u8> = (0..10).collect();
        let mut reader =
            CafReader::open(Cursor::new(build(32, &pcm16_mono(), &[], &samples))).unwrap();

        reader.seek_frame(3).unwrap();
        assert_eq!(reader.frame_position().unwrap(), 3);
        let mut buf = [0u8; 2];
        reader.read_raw(&mut buf).unwrap();
        assert_eq!(buf, [6, 7]);

        assert!(reader.seek_frame(5).is_ok());
        assert!(reader.seek_frame(6).is_err());
    }

    #[test]
    fn test_inspect_header_keeps_log_on_failure() {
        let mut file = build(32, &pcm16_mono(), &[], &[]);
        file.truncate(52);
        let (log, result) = inspect_header(&mut Cursor::new(file));
        assert!(result.unwrap_err().is_structural());
        assert!(log.text().contains("Bits / channel   : 16"));
        assert!(log.has_warnings());
    }

    #[test]
    fn test_data_hash_preserves_position() {
        let samples = vec![7u8; 64];
        let mut reader =
            CafReader::open(Cursor::new(build(32, &pcm16_mono(), &[], &samples))).unwrap();
        reader.seek_frame(4).unwrap();

        let hash = reader.data_hash().unwrap();
        assert_eq!(hash, blake3::hash(&samples).to_hex().to_string());
        assert_eq!(reader.frame_position().unwrap(), 4);
    }
}
