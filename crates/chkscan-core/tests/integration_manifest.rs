//! Integration test: list real 7z archives built with the sevenz-rust writer.

mod common;

use chkscan_core::manifest::{self, MarkerPolicy};
use chkscan_core::report::Classification;
use common::fixtures::{entryless_seven_zip, seven_zip};
use std::fs;

fn policy() -> MarkerPolicy {
    MarkerPolicy::new("DeepScreen/GmXmlDeepScreen/chksum", "QNX/chksum", "-12_HIGH")
}

#[test]
fn list_entries_returns_archive_paths_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("B.7z");
    fs::write(&path, seven_zip(&["DeepScreen/GmXmlDeepScreen/chksum", "bin/tool"])).unwrap();

    let entries = manifest::list_entries(&path).unwrap();
    assert_eq!(entries, vec!["DeepScreen/GmXmlDeepScreen/chksum", "bin/tool"]);
}

#[test]
fn inspect_picks_marker_by_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = seven_zip(&["QNX/chksum"]);
    let special = dir.path().join("A-12_HIGH.7z");
    let plain = dir.path().join("A.7z");
    fs::write(&special, &bytes).unwrap();
    fs::write(&plain, &bytes).unwrap();

    assert_eq!(
        manifest::inspect(&special, "A-12_HIGH.7z", &policy()).unwrap(),
        Classification::HasMarker
    );
    assert_eq!(
        manifest::inspect(&plain, "A.7z", &policy()).unwrap(),
        Classification::MissingMarker
    );
}

#[test]
fn archives_without_entries_list_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let written = dir.path().join("written.7z");
    let bare = dir.path().join("bare.7z");
    fs::write(&written, seven_zip(&[])).unwrap();
    fs::write(&bare, entryless_seven_zip()).unwrap();

    assert!(manifest::list_entries(&written).unwrap().is_empty());
    assert!(manifest::list_entries(&bare).unwrap().is_empty());
    assert_eq!(
        manifest::inspect(&bare, "C.7z", &policy()).unwrap(),
        Classification::MissingMarker
    );
}

#[test]
fn truncated_archive_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("B.7z");
    let bytes = seven_zip(&["DeepScreen/GmXmlDeepScreen/chksum"]);
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(manifest::inspect(&path, "B.7z", &policy()).is_err());
}
