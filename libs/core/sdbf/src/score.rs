// [libs/core/sdbf/src/score.rs]
//! Popularity scoring of rank sequences and the histogram-driven threshold
//! selection that budgets features per filter.

use crate::params::THRESHOLD_FLOOR;

/// Bins of the per-chunk score histogram. Scores are bounded by the
/// 64-position popularity window.
pub const SCORE_HISTO_BINS: usize = 66;

/// Rightmost position of the minimal nonzero rank in `ranks[lo..hi]`.
fn window_min(ranks: &[u16], lo: usize, hi: usize) -> Option<(usize, u16)> {
    let mut best: Option<(usize, u16)> = None;
    for (pos, &rank) in ranks[lo..hi].iter().enumerate() {
        if rank == 0 {
            continue;
        }
        match best {
            Some((_, best_rank)) if rank > best_rank => {}
            _ => best = Some((lo + pos, rank)),
        }
    }
    best
}

/// Score every position of a rank sequence.
///
/// Each popularity window `[i, i + pop_win)` nominates the rightmost
/// position holding its minimal nonzero rank; `scores[p]` counts the
/// nominations of `p`. Windows containing only zero ranks nominate nothing.
/// When `histogram` is given, `histogram[s]` additionally counts the
/// positions in `[0, len - pop_win)` whose final score is `s`.
///
/// The window minimum is maintained incrementally while it remains inside
/// the window (a single comparison against the entering rank); a full
/// rescan happens only when the minimum slides out on the left.
pub fn generate_chunk_scores(
    ranks: &[u16],
    scores: &mut [u16],
    histogram: Option<&mut [u32; SCORE_HISTO_BINS]>,
    pop_win: usize,
) {
    let len = ranks.len();
    debug_assert!(scores.len() >= len);
    scores[..len].fill(0);
    let windows = len.saturating_sub(pop_win);
    if windows > 0 {
        let mut best = window_min(ranks, 0, pop_win);
        for i in 0..windows {
            if i > 0 {
                let entering = i + pop_win - 1;
                let rank = ranks[entering];
                best = match best {
                    // Minimum departed on the left; rescan the window.
                    Some((pos, _)) if pos < i => window_min(ranks, i, i + pop_win),
                    // Ties go to the entering (rightmost) position.
                    Some((pos, best_rank)) => {
                        if rank != 0 && rank <= best_rank {
                            Some((entering, rank))
                        } else {
                            Some((pos, best_rank))
                        }
                    }
                    // Previous window was all-zero, so only the entering
                    // rank can nominate.
                    None => (rank != 0).then_some((entering, rank)),
                };
            }
            if let Some((pos, _)) = best {
                scores[pos] += 1;
            }
        }
    }
    if let Some(histogram) = histogram {
        histogram.fill(0);
        for &score in &scores[..windows] {
            histogram[score as usize] += 1;
        }
    }
}

/// Walk the score histogram downward from 65 and pick the feature
/// threshold for one chunk or block.
///
/// Descent stops (floor 16) as soon as admitting the next bin would push
/// the running feature count past `max_elem`. Returns the boundary score
/// `k` and `allowed`, the number of features still admissible at exactly
/// `k`.
pub fn select_threshold(
    histogram: &[u32; SCORE_HISTO_BINS],
    max_elem: u32,
) -> (u32, u32) {
    let mut k = (SCORE_HISTO_BINS - 1) as u32;
    let mut sum = 0u32;
    while k >= THRESHOLD_FLOOR {
        if sum <= max_elem && sum + histogram[k as usize] > max_elem {
            break;
        }
        sum += histogram[k as usize];
        k -= 1;
    }
    (k, max_elem - sum)
}
