//! 7z fixtures built at test time.

use sevenz_rust::{SevenZArchiveEntry, SevenZWriter};
use std::fs::{self, File};

/// Bytes of a 7z archive whose manifest lists exactly `entries` (files, each
/// holding its own name as content).
pub fn seven_zip(entries: &[&str]) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("fixture.7z");
    let mut writer = SevenZWriter::create(&archive_path).unwrap();
    for (i, name) in entries.iter().enumerate() {
        let src = dir.path().join(format!("payload-{}", i));
        fs::write(&src, name.as_bytes()).unwrap();
        let entry = SevenZArchiveEntry::from_path(&src, name.to_string());
        writer
            .push_archive_entry(entry, Some(File::open(&src).unwrap()))
            .unwrap();
    }
    writer.finish().unwrap();
    fs::read(&archive_path).unwrap()
}

/// The 32-byte archive 7-Zip writes when there is nothing to add: a signature
/// header whose next header is empty.
pub fn entryless_seven_zip() -> Vec<u8> {
    let mut bytes = vec![b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C, 0x00, 0x04];
    bytes.extend_from_slice(&0x0FD5_9B8Du32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 20]);
    bytes
}
