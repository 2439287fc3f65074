// [tests/mirror/apps/sdhash/cli_pipeline.test.rs]
//! The orchestration pipeline the binary drives: hash inputs from disk,
//! persist their digests, reload them and compare.

use std::fs;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdhash::cli::CommandArguments;
use sdhash::services::{comparison, hashing};
use sdhash_core_sdbf::codec;
use sdhash_domain_registry::DigestRegistry;

fn corpus(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

fn arguments(line: &[String]) -> CommandArguments {
    CommandArguments::parse_from(line).validate().expect("valid options")
}

#[test]
fn hashing_pipeline_skips_undersized_inputs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let good = dir.path().join("good.bin");
    let tiny = dir.path().join("tiny.bin");
    fs::write(&good, corpus(1, 64 * 1024)).expect("write input");
    fs::write(&tiny, [0u8; 64]).expect("write tiny input");

    let line = vec![
        "sdhash".to_owned(),
        good.display().to_string(),
        tiny.display().to_string(),
    ];
    let registry = DigestRegistry::new();
    let hashed = hashing::hash_inputs(&arguments(&line), &registry);

    assert_eq!(hashed, 1, "the undersized input must be skipped");
    assert_eq!(registry.len(), 1);
    assert!(registry.name(0).unwrap().ends_with("good.bin"));
}

#[test]
fn parallel_file_hashing_digests_every_input() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut line = vec!["sdhash".to_owned(), "-p".to_owned(), "4".to_owned()];
    for seed in 0..6u64 {
        let path = dir.path().join(format!("input-{seed}.bin"));
        fs::write(&path, corpus(seed, 32 * 1024)).expect("write input");
        line.push(path.display().to_string());
    }

    let registry = DigestRegistry::new();
    let hashed = hashing::hash_inputs(&arguments(&line), &registry);
    assert_eq!(hashed, 6);
    assert_eq!(registry.len(), 6);
}

#[test]
fn block_mode_produces_dd_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("dd-input.bin");
    fs::write(&input, corpus(9, 128 * 1024)).expect("write input");

    let line = vec![
        "sdhash".to_owned(),
        "-b".to_owned(),
        "16".to_owned(),
        input.display().to_string(),
    ];
    let registry = DigestRegistry::new();
    assert_eq!(hashing::hash_inputs(&arguments(&line), &registry), 1);

    let digest = registry.get(0).expect("digest present");
    assert!(digest.is_block());
    assert_eq!(digest.filter_count(), 8);
    assert!(codec::encode(&digest).starts_with("sdbf-dd:02:"));
}

#[test]
fn generated_digest_files_reload_for_comparison() {
    let dir = tempfile::tempdir().expect("temp dir");
    let shared = corpus(21, 128 * 1024);

    let original = dir.path().join("original.bin");
    let copy = dir.path().join("copy.bin");
    fs::write(&original, &shared).expect("write original");
    fs::write(&copy, &shared).expect("write copy");

    // Generate and persist the digests the way the default mode prints
    // them.
    let line = vec![
        "sdhash".to_owned(),
        original.display().to_string(),
        copy.display().to_string(),
    ];
    let generation = DigestRegistry::new();
    hashing::hash_inputs(&arguments(&line), &generation);
    let mut records = Vec::new();
    for index in 0..generation.len() {
        codec::write_digest(&mut records, &generation.get(index).unwrap()).expect("write record");
    }
    let digest_file = dir.path().join("digests.sdbf");
    fs::write(&digest_file, &records).expect("write digest file");

    // Reload and compare as `-c` would.
    let reloaded = DigestRegistry::new();
    let loaded =
        comparison::load_digest_file(&digest_file, &reloaded).expect("load digest file");
    assert_eq!(loaded, 2);
    let (score, _) = reloaded
        .compare(0, 1, &sdhash_core_sdbf::CompareOptions::default())
        .expect("indices valid");
    assert!(score >= 99, "copies reloaded from disk scored {score}");
}
