//! CAF file header and chunk header structures.
//!
//! Every CAF file starts with an 8-byte file header followed by a sequence of
//! chunks, each laid out as `[4-byte tag][i64 big-endian size][payload]`.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::error::{truncated, CafError, CafResult};
use crate::log::HeaderLog;
use crate::store::ByteStore;

/// CAF file type marker.
pub const CAFF_MARKER: FourCc = FourCc(*b"caff");

/// File format version written by this crate.
pub const CAF_VERSION: u16 = 1;

/// Size of the file header (marker, version, flags).
pub const FILE_HEADER_SIZE: u64 = 8;

/// Size of a chunk header (tag plus 64-bit size).
pub const CHUNK_HEADER_SIZE: u64 = 12;

/// A four-character code as stored on disk.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Reads four raw bytes.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Writes four raw bytes.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.0)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self)
    }
}

impl Serialize for FourCc {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Chunk types recognised by tag.
///
/// Only `Desc` and `Data` carry meaning for the codec; every other chunk is
/// skipped by its declared length. Tags this crate has never heard of land in
/// `Unknown` and are skipped the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ChunkTag {
    /// Audio description.
    Desc,
    /// Sample data.
    Data,
    /// Padding.
    Free,
    /// Channel layout.
    Chan,
    /// Information strings.
    Info,
    /// Instrument.
    Inst,
    /// Magic cookie.
    Kuki,
    /// Markers.
    Mark,
    /// MIDI.
    Midi,
    /// Overview.
    Ovvw,
    /// Packet table.
    Pakt,
    /// Peak values.
    Peak,
    /// Regions.
    Regn,
    /// Strings.
    Strg,
    /// Unique material identifier.
    Umid,
    /// User-defined.
    Uuid,
    /// Edit comments.
    Edct,
    /// Any other tag.
    Unknown(FourCc),
}

impl ChunkTag {
    /// Every named tag, in on-disk spelling order.
    const NAMED: [(ChunkTag, [u8; 4]); 17] = [
        (ChunkTag::Desc, *b"desc"),
        (ChunkTag::Data, *b"data"),
        (ChunkTag::Free, *b"free"),
        (ChunkTag::Chan, *b"chan"),
        (ChunkTag::Info, *b"info"),
        (ChunkTag::Inst, *b"inst"),
        (ChunkTag::Kuki, *b"kuki"),
        (ChunkTag::Mark, *b"mark"),
        (ChunkTag::Midi, *b"midi"),
        (ChunkTag::Ovvw, *b"ovvw"),
        (ChunkTag::Pakt, *b"pakt"),
        (ChunkTag::Peak, *b"peak"),
        (ChunkTag::Regn, *b"regn"),
        (ChunkTag::Strg, *b"strg"),
        (ChunkTag::Umid, *b"umid"),
        (ChunkTag::Uuid, *b"uuid"),
        (ChunkTag::Edct, *b"edct"),
    ];

    /// Classifies a raw tag.
    pub fn from_fourcc(code: FourCc) -> Self {
        Self::NAMED
            .iter()
            .find(|(_, bytes)| *bytes == code.0)
            .map(|(tag, _)| *tag)
            .unwrap_or(ChunkTag::Unknown(code))
    }

    /// Returns the on-disk tag.
    pub fn fourcc(self) -> FourCc {
        match self {
            ChunkTag::Unknown(code) => code,
            named => Self::NAMED
                .iter()
                .find(|(tag, _)| *tag == named)
                .map(|(_, bytes)| FourCc(*bytes))
                .unwrap_or(FourCc(*b"????")),
        }
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fourcc())
    }
}

impl From<ChunkTag> for String {
    fn from(tag: ChunkTag) -> Self {
        tag.to_string()
    }
}

/// The 8-byte header at the start of every CAF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// File type marker, `caff` for valid files.
    pub marker: FourCc,
    /// Format version.
    pub version: u16,
    /// Format flags.
    pub flags: u16,
}

impl FileHeader {
    /// The header this crate writes.
    pub fn current() -> Self {
        Self {
            marker: CAFF_MARKER,
            version: CAF_VERSION,
            flags: 0,
        }
    }

    /// Reads the file header.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let marker = FourCc::read_from(reader)?;
        let version = reader.read_u16::<BigEndian>()?;
        let flags = reader.read_u16::<BigEndian>()?;
        Ok(Self {
            marker,
            version,
            flags,
        })
    }

    /// Writes the file header.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.marker.write_to(writer)?;
        writer.write_u16::<BigEndian>(self.version)?;
        writer.write_u16::<BigEndian>(self.flags)?;
        Ok(())
    }
}

/// A chunk header: type tag plus declared payload size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Chunk type.
    pub tag: ChunkTag,
    /// Declared payload size in bytes. `-1` is legal for a trailing data chunk
    /// whose size was never filled in.
    pub size: i64,
}

impl ChunkHeader {
    /// Creates a chunk header.
    pub fn new(tag: ChunkTag, size: i64) -> Self {
        Self { tag, size }
    }

    /// Reads a chunk header.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let code = FourCc::read_from(reader)?;
        let size = reader.read_i64::<BigEndian>()?;
        Ok(Self {
            tag: ChunkTag::from_fourcc(code),
            size,
        })
    }

    /// Writes a chunk header.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.tag.fourcc().write_to(writer)?;
        writer.write_i64::<BigEndian>(self.size)?;
        Ok(())
    }
}

/// One entry of a chunk listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkEntry {
    /// Chunk type.
    pub tag: ChunkTag,
    /// Absolute offset of the chunk header.
    pub offset: u64,
    /// Declared payload size.
    pub size: i64,
}

impl ChunkEntry {
    /// Absolute offset of the first payload byte.
    pub fn payload_offset(&self) -> u64 {
        self.offset + CHUNK_HEADER_SIZE
    }
}

/// Skips a chunk payload by its declared size.
///
/// The skip is a relative seek, so a size that runs past the end of the store
/// simply leaves the cursor beyond EOF; the caller's remaining-bytes guard then
/// ends the walk.
pub(crate) fn skip_payload<S: Seek>(store: &mut S, header: &ChunkHeader, at: u64) -> CafResult<()> {
    if header.size < 0 {
        return Err(CafError::structural_at(
            format!("chunk '{}' declares negative size {}", header.tag, header.size),
            at,
        ));
    }
    store.seek(SeekFrom::Current(header.size))?;
    Ok(())
}

/// Lists every chunk that follows the file header.
///
/// Unlike the open path, the walk does not stop at the data chunk: chunks placed
/// after the sample data are reported too. A data chunk with size `-1` extends
/// to the end of the store and ends the listing.
pub fn list_chunks<S: Read + Seek>(store: &mut S) -> CafResult<Vec<ChunkEntry>> {
    let mut log = HeaderLog::new();
    list_chunks_logged(store, &mut log)
}

pub(crate) fn list_chunks_logged<S: Read + Seek>(
    store: &mut S,
    log: &mut HeaderLog,
) -> CafResult<Vec<ChunkEntry>> {
    let file_length = store.byte_len()?;

    store.seek(SeekFrom::Start(0))?;
    let file_header =
        FileHeader::read_from(store).map_err(|e| truncated(e, "file header", 0))?;
    if file_header.marker != CAFF_MARKER {
        return Err(CafError::structural_at(
            format!("not a CAF file (marker {})", file_header.marker),
            0,
        ));
    }

    let mut entries = Vec::new();
    let mut position = FILE_HEADER_SIZE;

    while position + CHUNK_HEADER_SIZE <= file_length {
        let header = ChunkHeader::read_from(store)
            .map_err(|e| truncated(e, "chunk header", position))?;
        log.chunk(&header, position);
        entries.push(ChunkEntry {
            tag: header.tag,
            offset: position,
            size: header.size,
        });

        if header.tag == ChunkTag::Data && header.size == -1 {
            break;
        }
        skip_payload(store, &header, position)?;

        position = position
            .checked_add(CHUNK_HEADER_SIZE + header.size as u64)
            .ok_or_else(|| CafError::structural_at("chunk size overflows file offset", position))?;
    }

    Ok(entries)
}
