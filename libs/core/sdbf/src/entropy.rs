// [libs/core/sdbf/src/entropy.rs]
//! 64-byte sliding-window Shannon entropy, fixed-point, and the mapping of
//! quantized entropies onto the empirical rank table.

use crate::params::{ENTR_POWER, ENTR_WIN_SIZE};
use crate::tables::{ENTROPY_64_INT, ENTR64_RANKS};

/// Histogram scratch for one sliding entropy window.
///
/// Counts fit in a byte because the window holds exactly 64 bytes.
#[derive(Debug)]
pub struct EntropyWindow {
    counts: [u8; 256],
}

impl Default for EntropyWindow {
    fn default() -> Self {
        Self { counts: [0u8; 256] }
    }
}

impl EntropyWindow {
    /// Recompute the scaled entropy of a full window from scratch,
    /// resetting the histogram.
    pub fn init(&mut self, window: &[u8]) -> u64 {
        debug_assert_eq!(window.len(), ENTR_WIN_SIZE);
        self.counts = [0u8; 256];
        for &byte in window {
            self.counts[byte as usize] += 1;
        }
        let table = &*ENTROPY_64_INT;
        self.counts
            .iter()
            .map(|&count| table[count as usize])
            .sum()
    }

    /// Slide the window one byte: `dropped` leaves on the left, `added`
    /// enters on the right. Adjusts the two affected histogram bins and
    /// their entropy contributions.
    pub fn advance(&mut self, entropy: u64, dropped: u8, added: u8) -> u64 {
        if dropped == added {
            return entropy;
        }
        let table = &*ENTROPY_64_INT;
        let old_count = self.counts[dropped as usize] as usize;
        let new_count = self.counts[added as usize] as usize;
        self.counts[dropped as usize] -= 1;
        self.counts[added as usize] += 1;
        entropy - table[old_count] + table[old_count - 1] - table[new_count]
            + table[new_count + 1]
    }
}

/// Map a scaled entropy onto its empirical rank. Zero means "ignore".
#[inline]
pub fn rank_of(entropy_scaled: u64) -> u16 {
    ENTR64_RANKS[(entropy_scaled >> ENTR_POWER) as usize]
}

/// Fill `ranks` with the per-position entropy ranks of `chunk`.
///
/// The window is recomputed from scratch at every multiple of `sync_size`
/// to bound drift, and advanced incrementally in between. Positions closer
/// than one window to the end of the chunk keep rank 0 and never nominate
/// features. When `carryover > 0` (stream chunk boundary), the last
/// `carryover` ranks of the previous chunk are first copied to the head of
/// the buffer.
pub fn generate_chunk_ranks(
    chunk: &[u8],
    ranks: &mut [u16],
    carryover: usize,
    entr_win_size: usize,
    sync_size: usize,
) {
    let len = chunk.len();
    debug_assert!(ranks.len() >= len);
    if carryover > 0 && carryover < len {
        ranks.copy_within(len - carryover..len, 0);
    }
    ranks[carryover.min(len)..len].fill(0);

    let mut window = EntropyWindow::default();
    let mut entropy = 0u64;
    for offset in 0..len.saturating_sub(entr_win_size) {
        entropy = if offset % sync_size == 0 {
            window.init(&chunk[offset..offset + entr_win_size])
        } else {
            window.advance(entropy, chunk[offset - 1], chunk[offset - 1 + entr_win_size])
        };
        ranks[offset] = rank_of(entropy);
    }
}
