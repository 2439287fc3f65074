// [tests/mirror/libs/core/sdbf/comparison_scenarios.test.rs]
//! End-to-end comparison behavior on synthetic corpora: identity, disjoint
//! content, embedded content and sparse edits.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdhash_core_sdbf::{compare_digests, hash_buffer, CompareOptions};

const MIB: usize = 1024 * 1024;

fn corpus(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn identity_comparison_scores_at_the_ceiling() {
    let data = corpus(0xA1, MIB);
    let digest = hash_buffer("identity.bin", &data);
    assert!(digest.filter_count() > 10, "corpus should span many filters");

    let (score, swapped) = compare_digests(&digest, &digest, &CompareOptions::default());
    // A final filter below the sparse-target bound can cost at most one
    // reference filter's contribution.
    assert!(score >= 99, "identity score was {score}");
    assert!(!swapped);
}

#[test]
fn disjoint_random_content_scores_near_zero() {
    let a = hash_buffer("left.bin", &corpus(0xB1, MIB));
    let b = hash_buffer("right.bin", &corpus(0xB2, MIB));
    let (score, _) = compare_digests(&a, &b, &CompareOptions::default());
    assert!(score <= 5, "disjoint content scored {score}");
}

#[test]
fn embedded_content_is_detected_with_a_swap() {
    let small = corpus(0xC1, MIB);
    let mut large = small.clone();
    large.extend_from_slice(&corpus(0xC2, 3 * MIB));

    let needle = hash_buffer("needle.bin", &small);
    let haystack = hash_buffer("haystack.bin", &large);

    // Larger digest first: canonicalization must flip it to the target.
    let (score, swapped) = compare_digests(&haystack, &needle, &CompareOptions::default());
    assert!(swapped, "larger digest should be demoted from reference");
    assert!(score >= 90, "embedded content scored {score}");

    // Same pair, smaller digest first: same score, no swap needed.
    let (score_direct, swapped_direct) =
        compare_digests(&needle, &haystack, &CompareOptions::default());
    assert_eq!(score, score_direct);
    assert!(!swapped_direct);
}

#[test]
fn sparse_edits_keep_high_similarity() {
    let original = corpus(0xD1, MIB);
    let mut edited = original.clone();
    for index in (0..edited.len()).step_by(1024) {
        edited[index] ^= 0xFF;
    }

    let a = hash_buffer("original.bin", &original);
    let b = hash_buffer("edited.bin", &edited);
    let (score, _) = compare_digests(&a, &b, &CompareOptions::default());
    assert!(score >= 80, "lightly edited content scored {score}");
}

#[test]
fn threaded_and_sequential_comparison_agree() {
    let a = hash_buffer("a.bin", &corpus(0xE1, MIB / 2));
    let b = hash_buffer("b.bin", &corpus(0xE1, MIB / 2));
    let sequential = compare_digests(&a, &b, &CompareOptions::default());
    let threaded = compare_digests(&a, &b, &CompareOptions::default().with_threads(8));
    assert_eq!(sequential, threaded);
    assert!(sequential.0 >= 99, "same-content digests must match fully");
}
