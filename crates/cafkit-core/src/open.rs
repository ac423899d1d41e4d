//! Entry points for opening streams.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::Path;

use crate::error::CafResult;
use crate::reader::CafReader;
use crate::session::WriteFormat;
use crate::writer::CafWriter;

/// Opens `store` for reading.
pub fn open_for_read<S: Read + Seek>(store: S) -> CafResult<CafReader<S>> {
    CafReader::open(store)
}

/// Opens `store` for writing a new stream described by `params`.
pub fn open_for_write<S: Write + Seek>(store: S, params: WriteFormat) -> CafResult<CafWriter<S>> {
    CafWriter::create(store, params)
}

/// Opens the file at `path` for reading.
pub fn open_path(path: impl AsRef<Path>) -> CafResult<CafReader<File>> {
    let file = File::open(path.as_ref())?;
    CafReader::open(file)
}

/// Creates (or truncates) the file at `path` and starts a new stream in it.
pub fn create_path(path: impl AsRef<Path>, params: WriteFormat) -> CafResult<CafWriter<File>> {
    params.validate()?;
    let file = File::create(path.as_ref())?;
    CafWriter::create(file, params)
}

/// Opens the file at `path` for appending, creating it if it does not exist.
pub fn append_path(path: impl AsRef<Path>, params: WriteFormat) -> CafResult<CafWriter<File>> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path.as_ref())?;
    CafWriter::append(file, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SampleFormat;
    use tempfile::tempdir;

    #[test]
    fn test_path_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.caf");

        let mut writer = create_path(&path, WriteFormat::stereo(SampleFormat::Float32, 48000)).unwrap();
        writer.write_raw(&[0u8; 8 * 25]).unwrap();
        writer.close().unwrap();

        let reader = open_path(&path).unwrap();
        assert_eq!(reader.session().format(), SampleFormat::Float32);
        assert_eq!(reader.session().frame_count(), 25);
    }

    #[test]
    fn test_create_path_validates_before_touching_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.caf");
        assert!(create_path(&path, WriteFormat::new(SampleFormat::Pcm16, 0, 8000)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_append_path_extends_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grow.caf");
        let params = WriteFormat::mono(SampleFormat::Pcm24, 96000);

        let mut writer = append_path(&path, params).unwrap();
        writer.write_raw(&[0u8; 30]).unwrap();
        writer.close().unwrap();

        let mut writer = append_path(&path, params).unwrap();
        writer.write_raw(&[0u8; 30]).unwrap();
        writer.close().unwrap();

        assert_eq!(open_path(&path).unwrap().session().frame_count(), 20);
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = open_path(dir.path().join("missing.caf")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Resource);
    }
}
