//! Byte store abstraction.
//!
//! The codec talks to its backing bytes through `std::io::{Read, Write, Seek}`.
//! The one extra capability it needs, the total length of the store, is
//! provided here for every seekable type.

use std::io::{self, Seek, SeekFrom};

/// A seekable byte store whose total length can be queried.
pub trait ByteStore: Seek {
    /// Returns the total length of the store in bytes.
    ///
    /// The current position is preserved.
    fn byte_len(&mut self) -> io::Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        if current != end {
            self.seek(SeekFrom::Start(current))?;
        }
        Ok(end)
    }
}

impl<S: Seek + ?Sized> ByteStore for S {}
