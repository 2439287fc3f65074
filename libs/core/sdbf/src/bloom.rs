// [libs/core/sdbf/src/bloom.rs]
//! Bloom filter bit manipulation: SHA-1 sub-word insertion, intersection
//! popcounts (naive and tiered), and the expected-overlap estimator with its
//! write-once `(s1, s2)` cache.

use std::sync::atomic::{AtomicU16, Ordering};

use crate::tables::{popcount16, BF_CLASS_MASKS};

/// Insert the five 32-bit sub-words of a SHA-1 digest into a filter.
///
/// Each sub-word is masked down to the class mask and addresses a single
/// bit. Returns how many of the five bit positions were newly set; zero
/// signals a repeated feature and the caller must not count it against the
/// filter's element budget.
pub fn sha1_insert(bf: &mut [u8], bf_class: usize, sha1_hash: [u32; 5]) -> u32 {
    let mask = BF_CLASS_MASKS[bf_class];
    let mut newly_set = 0;
    for word in sha1_hash {
        let masked = word & mask;
        let byte = (masked >> 3) as usize;
        let bit = 1u8 << (masked & 0x7);
        if bf[byte] & bit == 0 {
            newly_set += 1;
        }
        bf[byte] |= bit;
    }
    newly_set
}

/// Exact `popcount(f1 AND f2)` over two equal-length filters.
pub fn bitcount(bf1: &[u8], bf2: &[u8]) -> u32 {
    debug_assert_eq!(bf1.len(), bf2.len());
    bf1.chunks_exact(2)
        .zip(bf2.chunks_exact(2))
        .map(|(a, b)| {
            let word = u16::from_le_bytes([a[0] & b[0], a[1] & b[1]]);
            popcount16(word)
        })
        .sum()
}

/// Intersection popcount for 256-byte filters with a tiered early exit.
///
/// The bytes are consumed in cumulative tiers of 32, 64, 128 and 256; after
/// each of the first three tiers the partial count is extrapolated (x8, x4,
/// x2) and, if it falls short of `cut_off` even with `slack` added, 0 is
/// returned immediately. A nonzero return is always the exact popcount, and
/// `cut_off == 0` disables the short-circuit entirely.
pub fn bitcount_cut_256(bf1: &[u8], bf2: &[u8], cut_off: u32, slack: u32) -> u32 {
    debug_assert_eq!(bf1.len(), 256);
    debug_assert_eq!(bf2.len(), 256);

    let partial = |lo: usize, hi: usize| bitcount(&bf1[lo..hi], &bf2[lo..hi]);

    let mut result = partial(0, 32);
    if cut_off > 0 && 8 * result + slack < cut_off {
        return 0;
    }
    result += partial(32, 64);
    if cut_off > 0 && 4 * result + slack < cut_off {
        return 0;
    }
    result += partial(64, 128);
    if cut_off > 0 && 2 * result + slack < cut_off {
        return 0;
    }
    result + partial(128, 256)
}

// One u16 slot per (s1, s2) pair; zero doubles as "not yet computed".
// Concurrent writers race benignly: every writer stores the same value.
static EST_CACHE: [[AtomicU16; 256]; 256] =
    [const { [const { AtomicU16::new(0) }; 256] }; 256];

/// Expected number of bits set in both filters for element counts `s1` and
/// `s2` with `common` shared insertions, over `m` bits and `k` hashes:
///
/// `m * (1 - q^(k*s1) - q^(k*s2) + q^(k*(s1+s2-common)))`, `q = 1 - 1/m`.
///
/// The `common == 0` case is memoized in a 256x256 single-word-per-slot
/// cache; larger element counts bypass it.
pub fn match_est(m: u32, k: u32, s1: u32, s2: u32, common: u32) -> u32 {
    let cacheable = common == 0 && s1 < 256 && s2 < 256;
    if cacheable {
        let cached = EST_CACHE[s1 as usize][s2 as usize].load(Ordering::Relaxed);
        if cached != 0 {
            return u32::from(cached);
        }
    }
    let q = 1.0 - 1.0 / f64::from(m);
    let result = (f64::from(m)
        * (1.0 - q.powi((k * s1) as i32) - q.powi((k * s2) as i32)
            + q.powi((k * (s1 + s2 - common)) as i32)))
    .round() as u32;
    if cacheable {
        EST_CACHE[s1 as usize][s2 as usize].store(result as u16, Ordering::Relaxed);
    }
    result
}
