// [tests/mirror/libs/core/sdbf/stream_digest_scenarios.test.rs]
//! Stream-shape digest geometry and serialization on realistic inputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdhash_core_sdbf::params::{BF_SIZE, MAX_ELEM_STREAM};
use sdhash_core_sdbf::{codec, hash_buffer};

fn corpus(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn digest_geometry_invariants_hold() {
    for (seed, len) in [(1u64, 600), (2, 64 * 1024), (3, 1024 * 1024)] {
        let digest = hash_buffer("geom.bin", &corpus(seed, len));
        assert!(digest.filter_count() >= 1);
        assert_eq!(
            digest.buffer_len(),
            digest.filter_count() as usize * BF_SIZE,
            "filter bytes must equal size times count for len {len}"
        );
        for index in 0..digest.filter_count() {
            assert!(digest.elem_count(index) <= MAX_ELEM_STREAM);
        }
    }
}

#[test]
fn every_nonfinal_filter_is_full() {
    let digest = hash_buffer("full.bin", &corpus(4, 512 * 1024));
    assert!(digest.filter_count() > 2);
    for index in 0..digest.filter_count() - 1 {
        assert_eq!(digest.elem_count(index), MAX_ELEM_STREAM);
    }
    assert!(digest.elem_count(digest.filter_count() - 1) >= MAX_ELEM_STREAM / 8);
}

#[test]
fn hamming_weights_match_filter_bits() {
    let digest = hash_buffer("weights.bin", &corpus(5, 128 * 1024));
    let weights = digest.hamming();
    assert_eq!(weights.len(), digest.filter_count() as usize);
    for index in 0..digest.filter_count() {
        let expected: u32 = digest
            .filter(index)
            .iter()
            .map(|byte| byte.count_ones())
            .sum();
        assert_eq!(u32::from(weights[index as usize]), expected);
    }
}

#[test]
fn serialized_digests_survive_a_file_roundtrip() {
    let digests: Vec<_> = (0..4)
        .map(|seed| hash_buffer(&format!("input-{seed}.bin"), &corpus(seed + 10, 32 * 1024)))
        .collect();

    let mut serialized = Vec::new();
    for digest in &digests {
        codec::write_digest(&mut serialized, digest).expect("record write");
    }
    let reloaded = codec::read_digests(serialized.as_slice()).expect("record read");

    assert_eq!(reloaded.len(), digests.len());
    for (original, reloaded) in digests.iter().zip(&reloaded) {
        assert_eq!(original.name(), reloaded.name());
        assert_eq!(original.filter_count(), reloaded.filter_count());
        for index in 0..original.filter_count() {
            assert_eq!(original.filter(index), reloaded.filter(index));
            assert_eq!(original.elem_count(index), reloaded.elem_count(index));
        }
    }
}

#[test]
fn tiny_inputs_still_produce_a_digest() {
    let digest = hash_buffer("tiny.bin", &corpus(20, 600));
    assert_eq!(digest.filter_count(), 1);
    assert!(!digest.is_block());
}
