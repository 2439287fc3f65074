// [libs/core/sdbf/src/compare.rs]
//! Digest comparison: per-filter overlap estimation with a probabilistic
//! cutoff, per-reference-filter maxima, and the final averaged score.

use std::cmp::Ordering;
use std::thread;

use tracing::debug;

use crate::bloom;
use crate::digest::Sdbf;
use crate::params::{
    BITCOUNT_SLACK, MAX_THREADS, MIN_ELEM_COUNT, MIN_REF_ELEM_COUNT, SD_SCORE_SCALE,
};

/// Knobs of a single comparison run.
#[derive(Debug, Clone, Copy)]
pub struct CompareOptions {
    /// Workers fanned out per reference filter; 1 disables threading.
    pub thread_count: u32,
    /// When nonzero, only the first N reference filters are considered and
    /// averaged.
    pub sample_size: u32,
    /// Emit one `+`/`.` cell per target filter and the per-reference max
    /// (meaningful with `thread_count == 1`).
    pub heat_map: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            thread_count: 1,
            sample_size: 0,
            heat_map: false,
        }
    }
}

impl CompareOptions {
    pub fn with_threads(mut self, thread_count: u32) -> Self {
        self.thread_count = thread_count.clamp(1, MAX_THREADS);
        self
    }
}

/// Canonical reference ordering: fewer filters first, then smaller last
/// element count, then lexicographic name.
fn reference_order(a: &Sdbf, b: &Sdbf) -> Ordering {
    a.filter_count()
        .cmp(&b.filter_count())
        .then_with(|| {
            a.elem_count(a.filter_count() - 1)
                .cmp(&b.elem_count(b.filter_count() - 1))
        })
        .then_with(|| a.name().cmp(b.name()))
}

/// Compare two digests.
///
/// Returns the similarity score in `[-1, 100]` (-1 meaning no reference
/// filter held enough elements for an answer) and whether the operands were
/// swapped so that the smaller digest became the reference.
pub fn compare_digests(a: &Sdbf, b: &Sdbf, options: &CompareOptions) -> (i32, bool) {
    let swapped = reference_order(a, b) == Ordering::Greater;
    let (reference, target) = if swapped { (b, a) } else { (a, b) };

    // Force the lazy Hamming weights before any worker needs them.
    reference.hamming();
    target.hamming();

    let ref_count = if options.sample_size > 0 {
        reference.filter_count().min(options.sample_size)
    } else {
        reference.filter_count()
    };
    let threads = options.thread_count.min(target.filter_count().max(1));

    let mut score_sum = -1.0f64;
    for ref_index in 0..ref_count {
        let max_score = if threads < 2 {
            max_score_slice(reference, ref_index, ref_count, target, 0, 1, options.heat_map)
        } else {
            thread::scope(|scope| {
                let workers: Vec<_> = (0..threads)
                    .map(|tid| {
                        scope.spawn(move || {
                            max_score_slice(reference, ref_index, ref_count, target, tid, threads, false)
                        })
                    })
                    .collect();
                workers
                    .into_iter()
                    .map(|worker| worker.join().expect("comparison worker failed"))
                    .fold(-1.0f64, f64::max)
            })
        };
        if options.heat_map {
            println!("  {max_score:5.3}");
        }
        score_sum = if score_sum < 0.0 {
            max_score
        } else {
            score_sum + max_score
        };
    }

    let score = if score_sum < 0.0 {
        -1
    } else {
        (100.0 * score_sum / f64::from(ref_count)).round() as i32
    };
    debug!(
        reference = reference.name(),
        target = target.name(),
        score,
        swapped,
        "digests compared"
    );
    (score, swapped)
}

/// Maximum score of one reference filter against the target filters with
/// index `tid mod tcount`, or -1 when the reference filter is too small to
/// answer.
fn max_score_slice(
    reference: &Sdbf,
    ref_index: u32,
    ref_count: u32,
    target: &Sdbf,
    tid: u32,
    tcount: u32,
    emit_cells: bool,
) -> f64 {
    let s1 = reference.elem_count(ref_index);
    if s1 < MIN_ELEM_COUNT {
        return -1.0;
    }
    let bf1 = reference.filter(ref_index);
    let e1 = u32::from(reference.hamming()[ref_index as usize]);
    let bits = 8 * reference.filter_size();

    let mut max_score = -1.0f64;
    let mut j = tid;
    while j < target.filter_count() {
        let s2 = target.elem_count(j);
        // Sparse target filters only mislead multi-filter references.
        if ref_count > 1 && s2 < MIN_REF_ELEM_COUNT {
            j += tcount;
            continue;
        }
        let bf2 = target.filter(j);
        let e2 = u32::from(target.hamming()[j as usize]);

        let max_est = e1.min(e2);
        let min_est = bloom::match_est(bits, reference.hash_count, s1, s2, 0);
        let cut_off = (SD_SCORE_SCALE * (f64::from(max_est) - f64::from(min_est))
            + f64::from(min_est))
        .round() as u32;

        let mut matching = bloom::bitcount_cut_256(bf1, bf2, cut_off, BITCOUNT_SLACK);
        if matching > 0 {
            // Recount without the short-circuit so the cutoff cannot have
            // shaved the true overlap.
            matching = bloom::bitcount_cut_256(bf1, bf2, 0, 0);
        }
        let score = if matching <= cut_off {
            0.0
        } else {
            f64::from(matching - cut_off) / f64::from(max_est - cut_off)
        };
        if emit_cells {
            print!("{}", if score > 0.0 { "+" } else { "." });
        }
        if score > max_score {
            max_score = score;
        }
        j += tcount;
    }
    max_score
}
