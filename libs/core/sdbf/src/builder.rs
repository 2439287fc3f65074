// [libs/core/sdbf/src/builder.rs]
//! Digest generation: drives a byte buffer through rank generation, scoring
//! and SHA-1 feature insertion, in stream or block shape.

use std::thread;

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::bloom;
use crate::digest::{Sdbf, Shape};
use crate::entropy::generate_chunk_ranks;
use crate::params::{EngineParams, BF_SIZE, MIN_FILE_SIZE, STREAM_CHUNK_SIZE};
use crate::score::{generate_chunk_scores, select_threshold, SCORE_HISTO_BINS};

/// Five little-endian 32-bit sub-words of the SHA-1 digest of a feature.
#[inline]
fn sha1_words(feature: &[u8]) -> [u32; 5] {
    let hash = Sha1::digest(feature);
    let mut words = [0u32; 5];
    for (word, bytes) in words.iter_mut().zip(hash.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    words
}

/// Build a stream-shape digest over `data`.
///
/// The input is processed in 32 MiB chunks; filters fill sequentially and a
/// final filter left with fewer than `max_elem / 8` features is dropped.
pub fn hash_stream(name: &str, data: &[u8], params: &EngineParams) -> Sdbf {
    // Working estimate of the final digest size; trimmed exactly below.
    let capacity_hint = ((data.len() >> 11) + 1) << 8;
    let mut sdbf = Sdbf::new_stream(name, capacity_hint);

    let chunk_size = STREAM_CHUNK_SIZE;
    let full_chunks = data.len() / chunk_size;
    let remainder = data.len() % chunk_size;
    let scratch_len = data.len().min(chunk_size);
    let mut ranks = vec![0u16; scratch_len];
    let mut scores = vec![0u16; scratch_len];
    let mut histogram = [0u32; SCORE_HISTO_BINS];

    for chunk_index in 0..full_chunks {
        let chunk_pos = chunk_index * chunk_size;
        let chunk = &data[chunk_pos..chunk_pos + chunk_size];
        let carryover = if chunk_index == 0 {
            0
        } else {
            params.entr_win_size - 1
        };
        generate_chunk_ranks(chunk, &mut ranks, carryover, params.entr_win_size, params.sync_size);
        generate_chunk_scores(&ranks, &mut scores, Some(&mut histogram), params.pop_win_size);
        // The histogram threshold is derived for parity with the block
        // path; stream filtering below stays on the fixed floor.
        let (_selected, _allowed) = select_threshold(&histogram, params.max_elem);
        insert_stream_features(data, chunk_pos, &scores, chunk_size, &mut sdbf, params);
    }
    if remainder > 0 {
        let chunk_pos = full_chunks * chunk_size;
        let chunk = &data[chunk_pos..];
        generate_chunk_ranks(chunk, &mut ranks[..remainder], 0, params.entr_win_size, params.sync_size);
        generate_chunk_scores(&ranks[..remainder], &mut scores[..remainder], None, params.pop_win_size);
        insert_stream_features(data, chunk_pos, &scores[..remainder], remainder, &mut sdbf, params);
    }

    // Chop off an underfilled last filter; it mostly produces false
    // positives.
    let last_count = sdbf.elem_count(sdbf.filter_count() - 1);
    if sdbf.filter_count() > 1 && last_count < params.max_elem / 8 {
        sdbf.bf_count -= 1;
        sdbf.shape = Shape::Stream {
            last_count: params.max_elem,
        };
    }
    sdbf.buffer.truncate(sdbf.bf_count as usize * params.bf_size);
    sdbf.buffer.shrink_to_fit();

    debug!(
        name = sdbf.name(),
        filters = sdbf.filter_count(),
        bytes = data.len(),
        "stream digest generated"
    );
    sdbf
}

/// Stream digest of an in-memory buffer with default parameters.
pub fn hash_buffer(name: &str, data: &[u8]) -> Sdbf {
    hash_stream(name, data, &EngineParams::stream())
}

/// Hash one chunk's accepted features into the digest's current filter,
/// rolling over to a fresh filter whenever `max_elem` is reached.
fn insert_stream_features(
    data: &[u8],
    chunk_pos: usize,
    scores: &[u16],
    chunk_len: usize,
    sdbf: &mut Sdbf,
    params: &EngineParams,
) {
    let Shape::Stream { last_count } = &sdbf.shape else {
        unreachable!("stream insertion on a block-shape digest");
    };
    let mut last_count = *last_count;
    let bf_size = params.bf_size;
    for i in 0..chunk_len.saturating_sub(params.pop_win_size) {
        if u32::from(scores[i]) <= params.threshold {
            continue;
        }
        let feature = &data[chunk_pos + i..chunk_pos + i + params.pop_win_size];
        let current = (sdbf.bf_count as usize - 1) * bf_size;
        let filter = &mut sdbf.buffer[current..current + bf_size];
        let newly_set = bloom::sha1_insert(filter, 0, sha1_words(feature));
        // A feature that sets no new bit is a repeat and stays unbudgeted.
        if newly_set == 0 {
            continue;
        }
        last_count += 1;
        if last_count == params.max_elem {
            sdbf.buffer.resize(sdbf.buffer.len() + bf_size, 0);
            sdbf.bf_count += 1;
            last_count = 0;
        }
    }
    sdbf.shape = Shape::Stream { last_count };
}

/// Build a block-shape (dd) digest: filter `i` covers exactly the input
/// block `[i * block_size, (i + 1) * block_size)`.
///
/// A remainder shorter than 512 bytes is not hashed at all; a longer one is
/// processed after the regular blocks with the threshold floor and an
/// unrestricted quota. With `params.thread_count > 1`, regular blocks are
/// partitioned `i mod T` across scoped workers; every worker writes only
/// its own filters and element-count slots.
pub fn hash_block(name: &str, data: &[u8], block_size: u32, params: &EngineParams) -> Sdbf {
    let block = block_size as usize;
    let full_blocks = data.len() / block;
    let remainder = data.len() % block;
    let tail = remainder as u64 >= MIN_FILE_SIZE;
    let bf_count = (full_blocks + usize::from(tail)).max(1);

    let mut sdbf = Sdbf::new_block(name, bf_count as u32, block_size);
    let threads = (params.thread_count as usize).min(full_blocks.max(1));
    let engine = *params;

    {
        let Sdbf { buffer, shape, .. } = &mut sdbf;
        let Shape::Block { elem_counts, .. } = shape else {
            unreachable!("block builder produced a stream shape");
        };

        if threads < 2 {
            let mut scratch = BlockScratch::new(block);
            for (index, (filter, count)) in buffer
                .chunks_mut(BF_SIZE)
                .zip(elem_counts.iter_mut())
                .enumerate()
                .take(full_blocks)
            {
                let slice = &data[index * block..(index + 1) * block];
                *count = process_regular_block(slice, filter, &engine, &mut scratch);
            }
        } else {
            let mut lanes: Vec<Vec<(usize, &mut [u8], &mut u16)>> =
                (0..threads).map(|_| Vec::new()).collect();
            for (index, (filter, count)) in buffer
                .chunks_mut(BF_SIZE)
                .zip(elem_counts.iter_mut())
                .enumerate()
                .take(full_blocks)
            {
                lanes[index % threads].push((index, filter, count));
            }
            thread::scope(|scope| {
                for lane in lanes {
                    scope.spawn(move || {
                        let mut scratch = BlockScratch::new(block);
                        for (index, filter, count) in lane {
                            let slice = &data[index * block..(index + 1) * block];
                            *count = process_regular_block(slice, filter, &engine, &mut scratch);
                        }
                    });
                }
            });
        }

        // The tail block runs on the calling thread once the workers have
        // joined, at the threshold floor with a full quota.
        if tail {
            let slice = &data[full_blocks * block..];
            let mut scratch = BlockScratch::new(block);
            generate_chunk_ranks(
                slice,
                &mut scratch.ranks[..remainder],
                0,
                engine.entr_win_size,
                engine.sync_size,
            );
            generate_chunk_scores(
                &scratch.ranks[..remainder],
                &mut scratch.scores[..remainder],
                None,
                engine.pop_win_size,
            );
            let start = full_blocks * BF_SIZE;
            elem_counts[full_blocks] = insert_block_features(
                slice,
                &scratch.scores[..remainder],
                &mut buffer[start..start + BF_SIZE],
                engine.threshold,
                engine.max_elem,
                &engine,
            );
        }
    }

    debug!(
        name = sdbf.name(),
        filters = sdbf.filter_count(),
        block_size,
        threads,
        "block digest generated"
    );
    sdbf
}

/// Reusable per-worker rank/score/histogram buffers.
struct BlockScratch {
    ranks: Vec<u16>,
    scores: Vec<u16>,
    histogram: [u32; SCORE_HISTO_BINS],
}

impl BlockScratch {
    fn new(block: usize) -> Self {
        Self {
            ranks: vec![0u16; block],
            scores: vec![0u16; block],
            histogram: [0u32; SCORE_HISTO_BINS],
        }
    }
}

/// Rank, score, threshold and hash one full block into its filter.
fn process_regular_block(
    block: &[u8],
    filter: &mut [u8],
    params: &EngineParams,
    scratch: &mut BlockScratch,
) -> u16 {
    generate_chunk_ranks(block, &mut scratch.ranks, 0, params.entr_win_size, params.sync_size);
    generate_chunk_scores(
        &scratch.ranks,
        &mut scratch.scores,
        Some(&mut scratch.histogram),
        params.pop_win_size,
    );
    let (threshold, allowed) = select_threshold(&scratch.histogram, params.max_elem);
    insert_block_features(block, &scratch.scores, filter, threshold, allowed, params)
}

/// Left-to-right feature admission for one block: strictly above the
/// threshold always, at the threshold while the `allowed` quota lasts,
/// stopping at `max_elem` accepted features.
fn insert_block_features(
    data: &[u8],
    scores: &[u16],
    filter: &mut [u8],
    threshold: u32,
    mut allowed: u32,
    params: &EngineParams,
) -> u16 {
    let mut accepted = 0u32;
    for i in 0..scores.len().saturating_sub(params.pop_win_size) {
        if accepted >= params.max_elem {
            break;
        }
        let score = u32::from(scores[i]);
        if score > threshold || (score == threshold && allowed > 0) {
            let feature = &data[i..i + params.pop_win_size];
            let newly_set = bloom::sha1_insert(filter, 0, sha1_words(feature));
            if newly_set == 0 {
                continue;
            }
            accepted += 1;
            if score == threshold {
                allowed -= 1;
            }
        }
    }
    accepted as u16
}
