//! Chunk listing tests.

use std::io::Cursor;

use cafkit_core::{list_chunks, ChunkEntry, ChunkTag, FourCc};
use cafkit_tests::fixtures::{scenario_pcm16_mono, CafImage, DescFields};
use pretty_assertions::assert_eq;

#[test]
fn lists_reference_file() {
    let entries = list_chunks(&mut Cursor::new(scenario_pcm16_mono())).unwrap();
    assert_eq!(
        entries,
        vec![
            ChunkEntry {
                tag: ChunkTag::Desc,
                offset: 8,
                size: 32
            },
            ChunkEntry {
                tag: ChunkTag::Data,
                offset: 52,
                size: 2004
            },
        ]
    );
    assert_eq!(entries[1].payload_offset(), 64);
}

#[test]
fn lists_chunks_after_data() {
    let bytes = CafImage::new()
        .desc(&DescFields::pcm16_mono())
        .chunk(b"kuki", &[1, 2, 3, 4])
        .data(&[0u8; 8])
        .chunk(b"strg", &[0u8; 5])
        .chunk(b"wxyz", &[])
        .build();
    let entries = list_chunks(&mut Cursor::new(bytes)).unwrap();

    let summary: Vec<(ChunkTag, u64)> = entries.iter().map(|e| (e.tag, e.offset)).collect();
    assert_eq!(
        summary,
        vec![
            (ChunkTag::Desc, 8),
            (ChunkTag::Kuki, 52),
            (ChunkTag::Data, 68),
            (ChunkTag::Strg, 92),
            (ChunkTag::Unknown(FourCc(*b"wxyz")), 109),
        ]
    );
}

#[test]
fn open_ended_data_chunk_ends_listing() {
    let bytes = CafImage::new()
        .desc(&DescFields::pcm16_mono())
        .chunk_header(b"data", -1)
        .raw(&[0u8; 64])
        .build();
    let entries = list_chunks(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].size, -1);
}

#[test]
fn negative_size_is_rejected() {
    let bytes = CafImage::new()
        .desc(&DescFields::pcm16_mono())
        .chunk_header(b"free", -8)
        .raw(&[0u8; 16])
        .build();
    assert!(list_chunks(&mut Cursor::new(bytes)).unwrap_err().is_structural());
}

#[test]
fn wrong_marker_is_rejected() {
    let bytes = CafImage::with_marker(b"FORM").desc(&DescFields::pcm16_mono()).build();
    assert!(list_chunks(&mut Cursor::new(bytes)).unwrap_err().is_structural());
}

#[test]
fn tags_serialize_as_text() {
    let entry = ChunkEntry {
        tag: ChunkTag::Unknown(FourCc(*b"abcd")),
        offset: 8,
        size: 0,
    };
    let json = serde_json::to_value(entry).unwrap();
    assert_eq!(json["tag"], "abcd");
}
