//! File-backed session tests.
//!
//! Tests covering:
//! - Finalization idempotence on disk
//! - Finalize-on-drop
//! - Append (read-write) mode
//! - Logical end of data and trailing chunks
//! - Refusing to start a stream over existing bytes
//! - Serialized stream info

use std::fs;
use std::io::{Seek, SeekFrom, Write};

use cafkit_core::{
    append_path, create_path, open_for_write, open_path, ErrorKind, SampleFormat, WriteFormat,
};
use cafkit_tests::fixtures::{ramp, FileFixture};
use pretty_assertions::assert_eq;

#[test]
fn finalize_twice_gives_identical_files() {
    let fixture = FileFixture::new();
    let path = fixture.path("twice.caf");

    let mut writer = create_path(&path, WriteFormat::stereo(SampleFormat::Pcm16, 44100)).unwrap();
    writer.write_raw(&ramp(4 * 300)).unwrap();
    writer.finalize().unwrap();
    let region = writer.data_region();
    let first = fs::read(&path).unwrap();

    writer.finalize().unwrap();
    assert_eq!(writer.data_region(), region);
    let second = fs::read(&path).unwrap();
    assert_eq!(first, second);

    writer.close().unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);
}

#[test]
fn dropped_writer_is_finalized() {
    let fixture = FileFixture::new();
    let path = fixture.path("dropped.caf");
    {
        let mut writer =
            create_path(&path, WriteFormat::mono(SampleFormat::Float32, 48000)).unwrap();
        writer.write_raw(&[0u8; 4 * 480]).unwrap();
    }
    let reader = open_path(&path).unwrap();
    assert_eq!(reader.session().frame_count(), 480);
}

#[test]
fn append_preserves_and_extends_samples() {
    let fixture = FileFixture::new();
    let path = fixture.path("append.caf");
    let params = WriteFormat::mono(SampleFormat::Pcm16, 16000);

    let mut writer = append_path(&path, params).unwrap();
    writer.write_raw(&ramp(100)).unwrap();
    writer.close().unwrap();

    let mut writer = append_path(&path, WriteFormat::stereo(SampleFormat::ALaw, 8000)).unwrap();
    assert_eq!(writer.session().format(), SampleFormat::Pcm16);
    assert_eq!(writer.session().sample_rate(), 16000);
    writer.write_raw(&[0xFF; 50]).unwrap();
    writer.close().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[68..168], &ramp(100)[..]);
    assert_eq!(&bytes[168..], &[0xFF; 50][..]);
    assert_eq!(open_path(&path).unwrap().session().frame_count(), 75);
}

#[test]
fn append_rejects_non_canonical_layout() {
    let fixture = FileFixture::new();
    let bytes = cafkit_tests::fixtures::CafImage::new()
        .desc(&cafkit_tests::fixtures::DescFields::pcm16_mono())
        .chunk(b"free", &[0u8; 8])
        .data(&[0u8; 8])
        .build();
    let path = fixture.write("padded.caf", &bytes);

    assert!(append_path(&path, WriteFormat::mono(SampleFormat::Pcm16, 44100)).is_err());
    assert_eq!(fs::read(&path).unwrap(), bytes);
}

#[test]
fn logical_end_excludes_trailing_chunk() {
    let fixture = FileFixture::new();
    let path = fixture.path("trailer.caf");

    let mut writer = create_path(&path, WriteFormat::mono(SampleFormat::Pcm16, 44100)).unwrap();
    writer.write_raw(&[0u8; 200]).unwrap();
    let end = writer.mark_data_end().unwrap();
    assert_eq!(end, 268);

    // A trailing chunk written after the samples.
    let mut trailer = Vec::new();
    trailer.extend_from_slice(b"free");
    trailer.extend_from_slice(&8i64.to_be_bytes());
    trailer.extend_from_slice(&[0u8; 8]);
    writer.write_raw(&trailer).unwrap();
    writer.close().unwrap();

    let reader = open_path(&path).unwrap();
    assert_eq!(reader.session().frame_count(), 100 + 10);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[52..56], b"data");
    assert_eq!(&bytes[56..64], &200i64.to_be_bytes());
    assert_eq!(&bytes[268..272], b"free");
    assert_eq!(bytes.len(), 268 + 20);
}

#[test]
fn new_stream_over_existing_file_is_rejected() {
    let fixture = FileFixture::new();
    let path = fixture.write("leftover.caf", &[0xAA; 500]);

    let file = fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .unwrap();
    let err = open_for_write(file, WriteFormat::mono(SampleFormat::Pcm16, 44100)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(fs::read(&path).unwrap(), vec![0xAA; 500]);

    // Truncating first gives a clean stream.
    let mut writer = create_path(&path, WriteFormat::mono(SampleFormat::Pcm16, 44100)).unwrap();
    writer.close().unwrap();
    assert_eq!(open_path(&path).unwrap().session().frame_count(), 0);
}

#[test]
fn finalize_counts_bytes_written_outside_the_writer() {
    let fixture = FileFixture::new();
    let path = fixture.path("external.caf");

    let mut writer = create_path(&path, WriteFormat::mono(SampleFormat::Pcm16, 44100)).unwrap();
    writer.write_raw(&[0u8; 10]).unwrap();
    {
        let mut other = fs::OpenOptions::new().write(true).open(&path).unwrap();
        other.seek(SeekFrom::End(0)).unwrap();
        other.write_all(&[0u8; 6]).unwrap();
    }
    writer.finalize().unwrap();
    assert_eq!(writer.data_region().length, 16);
    writer.close().unwrap();
}

#[test]
fn stream_info_serializes() {
    let fixture = FileFixture::new();
    let path = fixture.path("info.caf");

    let mut writer = create_path(
        &path,
        WriteFormat::stereo(SampleFormat::Pcm24, 48000).with_endian(cafkit_core::Endianness::Big),
    )
    .unwrap();
    writer.write_raw(&[0u8; 6 * 48000]).unwrap();
    writer.close().unwrap();

    let info = open_path(&path).unwrap().info();
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["format"], "pcm24");
    assert_eq!(json["endianness"], "big");
    assert_eq!(json["channels"], 2);
    assert_eq!(json["frames"], 48000);
    assert_eq!(json["duration_seconds"], 1.0);
    assert_eq!(json["data_offset"], 68);
}
