#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut reader) = cafkit_core::open_for_read(Cursor::new(data)) {
        let region = reader.data_region();
        assert!(region.end() <= data.len() as u64);

        let mut buf = [0u8; 256];
        while let Ok(n) = reader.read_raw(&mut buf) {
            if n == 0 {
                break;
            }
        }
        let _ = reader.data_hash();
    }
    let _ = cafkit_core::list_chunks(&mut Cursor::new(data));
});
