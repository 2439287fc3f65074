// [tests/mirror/libs/infra/mapfile/mapfile_skip_policy.test.rs]
//! The skip policy end to end: what gets mapped and what gets left out.

use std::fs;
use std::io::Write as _;

use sdhash_infra_mapfile::{MapFileError, MappedFile};

#[test]
fn acceptable_files_map_with_full_content() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("payload.bin");
    let payload: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
    fs::write(&path, &payload).expect("write payload");

    let mapped = MappedFile::open(&path, 512).expect("map payload");
    assert_eq!(mapped.len(), payload.len());
    assert_eq!(mapped.bytes(), payload.as_slice());
    assert!(mapped.name().ends_with("payload.bin"));
}

#[test]
fn each_skip_condition_is_reported_distinctly() {
    let dir = tempfile::tempdir().expect("temp dir");

    let missing = dir.path().join("missing.bin");
    assert!(matches!(
        MappedFile::open(&missing, 512),
        Err(MapFileError::Open { .. })
    ));

    let short = dir.path().join("short.bin");
    let mut file = fs::File::create(&short).expect("create short file");
    file.write_all(&[0u8; 511]).expect("write short file");
    drop(file);
    assert!(matches!(
        MappedFile::open(&short, 512),
        Err(MapFileError::TooSmall { size: 511, .. })
    ));

    assert!(MappedFile::open(dir.path(), 512).is_err());
}

#[test]
fn minimum_size_boundary_is_inclusive() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("exact.bin");
    fs::write(&path, vec![7u8; 512]).expect("write exact file");
    assert!(MappedFile::open(&path, 512).is_ok());
}
