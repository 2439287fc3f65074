// [apps/sdhash/src/services/hashing.rs]
//! Multi-file hashing orchestration: maps each input, builds its digest and
//! enqueues it into the registry.

use std::path::Path;
use std::thread;

use sdhash_core_sdbf::params::MIN_FILE_SIZE;
use sdhash_core_sdbf::{hash_block, hash_stream, EngineParams, Sdbf};
use sdhash_domain_registry::DigestRegistry;
use sdhash_infra_mapfile::MappedFile;
use tracing::warn;

use crate::cli::CommandArguments;

/// Hash every input file into the registry. Returns how many files were
/// actually hashed (skipped inputs are not counted).
///
/// Stream mode parallelizes across files: worker `t` handles the inputs
/// with index `i mod T == t`, so registry insertion order is only
/// deterministic for a single worker. Block mode processes files one by
/// one and parallelizes across the blocks inside each file instead.
pub fn hash_inputs(arguments: &CommandArguments, registry: &DigestRegistry) -> usize {
    match arguments.block_size_kib {
        Some(kib) => hash_inputs_block(arguments, registry, kib * 1024),
        None => hash_inputs_stream(arguments, registry),
    }
}

fn hash_inputs_stream(arguments: &CommandArguments, registry: &DigestRegistry) -> usize {
    let params = EngineParams::stream();
    let threads = (arguments.thread_count as usize).min(arguments.files.len().max(1));
    if threads < 2 {
        let mut hashed = 0usize;
        for path in &arguments.files {
            if let Some(digest) = hash_one_stream(path, arguments.warnings, &params) {
                if enqueue(registry, digest) {
                    hashed += 1;
                }
            }
        }
        return hashed;
    }

    thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|tid| {
                let files = &arguments.files;
                scope.spawn(move || {
                    let mut hashed = 0usize;
                    for path in files.iter().skip(tid).step_by(threads) {
                        if let Some(digest) = hash_one_stream(path, arguments.warnings, &params) {
                            if enqueue(registry, digest) {
                                hashed += 1;
                            }
                        }
                    }
                    hashed
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("file hashing worker failed"))
            .sum()
    })
}

fn hash_inputs_block(
    arguments: &CommandArguments,
    registry: &DigestRegistry,
    block_size: u32,
) -> usize {
    let params = EngineParams::block().with_threads(arguments.thread_count);
    let mut hashed = 0usize;
    for path in &arguments.files {
        let Some(mapped) = map_input(path, arguments.warnings) else {
            continue;
        };
        let digest = hash_block(mapped.name(), mapped.bytes(), block_size, &params);
        if enqueue(registry, digest) {
            hashed += 1;
        }
    }
    hashed
}

fn hash_one_stream(path: &Path, warnings: bool, params: &EngineParams) -> Option<Sdbf> {
    let mapped = map_input(path, warnings)?;
    Some(hash_stream(mapped.name(), mapped.bytes(), params))
}

fn map_input(path: &Path, warnings: bool) -> Option<MappedFile> {
    match MappedFile::open(path, MIN_FILE_SIZE) {
        Ok(mapped) => Some(mapped),
        Err(skip) => {
            if warnings {
                warn!("{skip}. Skipping.");
            }
            None
        }
    }
}

fn enqueue(registry: &DigestRegistry, digest: Sdbf) -> bool {
    match registry.add(digest) {
        Ok(_) => true,
        Err(full) => {
            warn!("{full}; digest dropped");
            false
        }
    }
}
