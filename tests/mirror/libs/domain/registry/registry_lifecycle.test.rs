// [tests/mirror/libs/domain/registry/registry_lifecycle.test.rs]
//! Registry behavior under a full workload: concurrent ingestion, indexed
//! comparison and lookup.

use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdhash_core_sdbf::{hash_buffer, CompareOptions};
use sdhash_domain_registry::DigestRegistry;

fn corpus(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn concurrent_ingestion_keeps_every_digest() {
    let registry = Arc::new(DigestRegistry::new());
    let workers = 4;
    let per_worker = 8;

    thread::scope(|scope| {
        for tid in 0..workers {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                for item in 0..per_worker {
                    let seed = (tid * per_worker + item) as u64;
                    let digest =
                        hash_buffer(&format!("input-{tid}-{item}"), &corpus(seed, 4096));
                    registry.add(digest).expect("capacity not reached");
                }
            });
        }
    });

    assert_eq!(registry.len(), workers * per_worker);
    for index in 0..registry.len() {
        assert!(registry.get(index).is_some());
        assert!(registry.name(index).is_some());
    }
}

#[test]
fn indexed_comparison_matches_direct_comparison() {
    let registry = DigestRegistry::new();
    let data = corpus(77, 64 * 1024);
    registry.add(hash_buffer("same-a", &data)).unwrap();
    registry.add(hash_buffer("same-b", &data)).unwrap();
    registry
        .add(hash_buffer("other", &corpus(78, 64 * 1024)))
        .unwrap();

    let options = CompareOptions::default();
    let (twin_score, _) = registry.compare(0, 1, &options).unwrap();
    let (other_score, _) = registry.compare(0, 2, &options).unwrap();
    assert!(twin_score >= 99, "identical content scored {twin_score}");
    assert!(other_score <= 5, "unrelated content scored {other_score}");
}

#[test]
fn lookup_scans_in_insertion_order() {
    let registry = DigestRegistry::new();
    let shared = corpus(79, 32 * 1024);
    registry.add(hash_buffer("unrelated", &corpus(80, 32 * 1024))).unwrap();
    registry.add(hash_buffer("copy-1", &shared)).unwrap();
    registry.add(hash_buffer("copy-2", &shared)).unwrap();

    let query = hash_buffer("query", &shared);
    let (index, score) = registry
        .lookup_first_above(&query, 90, &CompareOptions::default())
        .expect("a copy must qualify");
    assert_eq!(index, 1, "lookup must stop at the first qualifying digest");
    assert!(score >= 90);
}

#[test]
fn removal_by_prefix_shifts_subsequent_indices() {
    let registry = DigestRegistry::new();
    registry.add(hash_buffer("alpha-one", &corpus(81, 4096))).unwrap();
    registry.add(hash_buffer("alpha-two", &corpus(82, 4096))).unwrap();
    registry.add(hash_buffer("beta", &corpus(83, 4096))).unwrap();

    assert_eq!(registry.remove_first_with_prefix("alpha"), 2);
    assert_eq!(registry.name(0).as_deref(), Some("alpha-two"));
    assert_eq!(registry.name(1).as_deref(), Some("beta"));
}
