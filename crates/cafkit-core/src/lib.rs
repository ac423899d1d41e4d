//! cafkit Core
//!
//! This crate reads and writes the framing of Core Audio Format (CAF) files:
//! the file header, the format descriptor and the location of the raw sample
//! bytes. Sample values are never converted; callers move raw bytes in and
//! out of the data region.
//!
//! # Overview
//!
//! A CAF file is an 8-byte file header followed by chunks, each laid out as
//! `[4-byte tag][i64 big-endian size][payload]`. Two chunks matter here:
//!
//! - **`desc`** - sample rate, format id, flags and packet shape
//! - **`data`** - a 4-byte edit count followed by the sample bytes
//!
//! Every other chunk is skipped when reading and never written.
//!
//! # Supported encodings
//!
//! Signed 16/24/32-bit PCM, 32/64-bit IEEE float, A-law and µ-law, in either
//! byte order. Anything else is reported as
//! [`CafError::UnsupportedFormat`].
//!
//! # Example
//!
//! ```no_run
//! use cafkit_core::{open_for_read, open_for_write, SampleFormat, WriteFormat};
//! use std::fs::File;
//!
//! # fn main() -> cafkit_core::CafResult<()> {
//! let file = File::create("tone.caf")?;
//! let mut writer = open_for_write(file, WriteFormat::stereo(SampleFormat::Pcm16, 44100))?;
//! writer.write_raw(&[0u8; 4 * 1000])?;
//! writer.close()?;
//!
//! let reader = open_for_read(File::open("tone.caf")?)?;
//! assert_eq!(reader.session().frame_count(), 1000);
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Structure
//!
//! - [`reader`] - Header parser and read handle
//! - [`writer`] - Two-phase header writer and write handle
//! - [`descriptor`] - The `desc` record and the format decode rules
//! - [`chunk`] - File and chunk headers, chunk listing
//! - [`session`] - Per-stream format state
//! - [`log`] - Per-stream header diagnostics

pub mod chunk;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod log;
pub mod open;
pub mod reader;
pub mod session;
pub mod store;
pub mod writer;

pub use chunk::{list_chunks, ChunkEntry, ChunkHeader, ChunkTag, FileHeader, FourCc};
pub use descriptor::{decode, Descriptor};
pub use error::{CafError, CafResult, ErrorKind};
pub use format::{EndianRequest, Endianness, SampleFormat};
pub use log::{HeaderLog, LogLevel, LogLine};
pub use open::{append_path, create_path, open_for_read, open_for_write, open_path};
pub use reader::{inspect_header, CafReader};
pub use session::{DataRegion, FormatSession, StreamInfo, WriteFormat, MAX_CHANNELS};
pub use store::ByteStore;
pub use writer::{CafWriter, HeaderBuffer, HEADER_SIZE};
