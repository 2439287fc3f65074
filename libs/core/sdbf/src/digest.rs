// [libs/core/sdbf/src/digest.rs]
//! The similarity digest value: a named sequence of equally-sized Bloom
//! filters plus the bookkeeping needed to compare and serialize it.

use std::sync::OnceLock;

use crate::params::{BF_SIZE, HASH_COUNT, MAX_ELEM_DD, MAX_ELEM_STREAM};
use crate::tables::{popcount16, BF_CLASS_MASKS};

/// Filter-count bookkeeping that differs between the two digest shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Filters fill sequentially; every filter except the last holds
    /// exactly `max_elem` features and only the last count is recorded.
    Stream { last_count: u32 },
    /// Each filter covers one fixed-size input block and records its own
    /// element count.
    Block {
        block_size: u32,
        elem_counts: Vec<u16>,
    },
}

/// A similarity digest (SDBF).
///
/// Immutable after construction, except for the Hamming-weight array which
/// is derived lazily on first comparison.
#[derive(Debug)]
pub struct Sdbf {
    pub(crate) name: String,
    pub(crate) bf_size: u32,
    pub(crate) hash_count: u32,
    pub(crate) mask: u32,
    pub(crate) max_elem: u32,
    pub(crate) bf_count: u32,
    pub(crate) buffer: Vec<u8>,
    pub(crate) shape: Shape,
    pub(crate) hamming: OnceLock<Vec<u16>>,
}

impl Sdbf {
    /// Empty stream-shape digest with one zeroed filter, ready for the
    /// stream builder.
    pub(crate) fn new_stream(name: &str, capacity_hint: usize) -> Self {
        let mut buffer = Vec::with_capacity(capacity_hint.max(BF_SIZE));
        buffer.resize(BF_SIZE, 0);
        Self {
            name: name.to_owned(),
            bf_size: BF_SIZE as u32,
            hash_count: HASH_COUNT,
            mask: BF_CLASS_MASKS[0],
            max_elem: MAX_ELEM_STREAM,
            bf_count: 1,
            buffer,
            shape: Shape::Stream { last_count: 0 },
            hamming: OnceLock::new(),
        }
    }

    /// Empty block-shape digest with `bf_count` preallocated zeroed
    /// filters, ready for the block builder.
    pub(crate) fn new_block(name: &str, bf_count: u32, block_size: u32) -> Self {
        Self {
            name: name.to_owned(),
            bf_size: BF_SIZE as u32,
            hash_count: HASH_COUNT,
            mask: BF_CLASS_MASKS[0],
            max_elem: MAX_ELEM_DD,
            bf_count,
            buffer: vec![0u8; bf_count as usize * BF_SIZE],
            shape: Shape::Block {
                block_size,
                elem_counts: vec![0u16; bf_count as usize],
            },
            hamming: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of Bloom filters in the digest.
    pub fn filter_count(&self) -> u32 {
        self.bf_count
    }

    pub fn filter_size(&self) -> u32 {
        self.bf_size
    }

    pub fn max_elem(&self) -> u32 {
        self.max_elem
    }

    pub fn is_block(&self) -> bool {
        matches!(self.shape, Shape::Block { .. })
    }

    /// Underlying bytes of filter `index`.
    pub fn filter(&self, index: u32) -> &[u8] {
        let size = self.bf_size as usize;
        let start = index as usize * size;
        &self.buffer[start..start + size]
    }

    /// Number of features inserted into filter `index`.
    ///
    /// Stream shape stores only the last filter's count; all earlier
    /// filters are full by construction.
    pub fn elem_count(&self, index: u32) -> u32 {
        match &self.shape {
            Shape::Stream { last_count } => {
                if index + 1 < self.bf_count {
                    self.max_elem
                } else {
                    *last_count
                }
            }
            Shape::Block { elem_counts, .. } => u32::from(elem_counts[index as usize]),
        }
    }

    /// Per-filter Hamming weights, computed once on first use.
    pub fn hamming(&self) -> &[u16] {
        self.hamming.get_or_init(|| {
            self.buffer
                .chunks_exact(self.bf_size as usize)
                .map(|filter| {
                    filter
                        .chunks_exact(2)
                        .map(|pair| popcount16(u16::from_le_bytes([pair[0], pair[1]])) as u16)
                        .sum()
                })
                .collect()
        })
    }

    /// Total size of the filter buffer in bytes.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}
