// [libs/core/sdbf/src/params.rs]
//! Engine constants and the explicit parameter block threaded through the
//! builders and the comparator.

/// Bloom filter size in bytes (2048 bits).
pub const BF_SIZE: usize = 256;
/// SHA-1 sub-words inserted per feature.
pub const HASH_COUNT: u32 = 5;
/// Entropy quantization bins.
pub const BINS: u32 = 1000;
/// Fixed-point shift applied to scaled entropies.
pub const ENTR_POWER: u32 = 10;
/// Full fixed-point scale: `BINS * 2^ENTR_POWER`.
pub const ENTR_SCALE: u32 = BINS * (1 << ENTR_POWER);
/// Sliding entropy window, in bytes.
pub const ENTR_WIN_SIZE: usize = 64;
/// Popularity window over ranks, in positions. Also the feature length.
pub const POP_WIN_SIZE: usize = 64;
/// Offset interval at which the entropy window is recomputed from scratch.
pub const SYNC_SIZE: usize = 16384;
/// Stream-mode processing chunk.
pub const STREAM_CHUNK_SIZE: usize = 32 * 1024 * 1024;
/// Score floor below which a position can never become a feature.
pub const THRESHOLD_FLOOR: u32 = 16;
/// Per-filter feature budget, stream shape.
pub const MAX_ELEM_STREAM: u32 = 160;
/// Per-filter feature budget, block (dd) shape.
pub const MAX_ELEM_DD: u32 = 192;
/// Smallest input (and smallest block-mode remainder) worth hashing.
pub const MIN_FILE_SIZE: u64 = 512;
/// Reference filters with fewer elements produce no answer.
pub const MIN_ELEM_COUNT: u32 = 6;
/// Target filters with fewer elements are skipped for multi-filter references.
pub const MIN_REF_ELEM_COUNT: u32 = 64;
/// Fraction of the estimator range added to the zero cutoff.
pub const SD_SCORE_SCALE: f64 = 0.3;
/// Popcount slack granted before the tiered comparison short-circuits.
pub const BITCOUNT_SLACK: u32 = 48;
/// Upper bound on worker counts accepted anywhere in the engine.
pub const MAX_THREADS: u32 = 512;

/// Tunables for digest generation, carried explicitly by the builders.
///
/// The defaults reproduce the shipped behavior; only `thread_count` is
/// routinely overridden.
#[derive(Debug, Clone, Copy)]
pub struct EngineParams {
    pub thread_count: u32,
    pub entr_win_size: usize,
    pub bf_size: usize,
    pub pop_win_size: usize,
    pub threshold: u32,
    pub max_elem: u32,
    pub sync_size: usize,
}

impl EngineParams {
    /// Parameters for stream-shape digests.
    pub fn stream() -> Self {
        Self {
            thread_count: 1,
            entr_win_size: ENTR_WIN_SIZE,
            bf_size: BF_SIZE,
            pop_win_size: POP_WIN_SIZE,
            threshold: THRESHOLD_FLOOR,
            max_elem: MAX_ELEM_STREAM,
            sync_size: SYNC_SIZE,
        }
    }

    /// Parameters for block-shape digests.
    pub fn block() -> Self {
        Self {
            max_elem: MAX_ELEM_DD,
            ..Self::stream()
        }
    }

    pub fn with_threads(mut self, thread_count: u32) -> Self {
        self.thread_count = thread_count.clamp(1, MAX_THREADS);
        self
    }
}
