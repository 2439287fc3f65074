// [apps/sdhash/src/services/comparison.rs]
//! Comparison output: digest-file loading, pair enumeration and the
//! `name|name|score` result lines.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use sdhash_core_sdbf::{codec, CompareOptions};
use sdhash_domain_registry::DigestRegistry;
use tracing::info;

use crate::cli::CommandArguments;

/// Load every digest record of `path` into the registry. Returns how many
/// records were loaded. Decode failures are fatal for the whole load.
pub fn load_digest_file(path: &Path, registry: &DigestRegistry) -> Result<usize> {
    let file = File::open(path)
        .with_context(|| format!("could not open digest file '{}'", path.display()))?;
    let digests = codec::read_digests(BufReader::new(file))
        .with_context(|| format!("could not load digest file '{}'", path.display()))?;
    let mut loaded = 0usize;
    for digest in digests {
        registry.add(digest)?;
        loaded += 1;
    }
    info!(path = %path.display(), loaded, "digest file loaded");
    Ok(loaded)
}

/// `-c` mode: one digest file gives an all-pairs comparison, two give a
/// first-file-against-second-file comparison.
pub fn run_compare_mode(arguments: &CommandArguments, registry: &DigestRegistry) -> Result<()> {
    load_digest_file(&arguments.files[0], registry)?;
    let options = arguments.compare_options();
    if arguments.files.len() == 2 {
        let query_count = registry.len();
        load_digest_file(&arguments.files[1], registry)?;
        compare_across(registry, query_count, &options, arguments.output_threshold)
    } else {
        compare_all_pairs(registry, &options, arguments.output_threshold)
    }
}

/// Compare every unordered pair of registry digests and print qualifying
/// scores.
pub fn compare_all_pairs(
    registry: &DigestRegistry,
    options: &CompareOptions,
    output_threshold: i32,
) -> Result<()> {
    let size = registry.len();
    for first in 0..size.saturating_sub(1) {
        for second in first + 1..size {
            emit(registry, first, second, options, output_threshold)?;
        }
    }
    Ok(())
}

/// Compare each digest of the query set (indices below `split`) against
/// each digest of the target set.
fn compare_across(
    registry: &DigestRegistry,
    split: usize,
    options: &CompareOptions,
    output_threshold: i32,
) -> Result<()> {
    for query in 0..split {
        for target in split..registry.len() {
            emit(registry, query, target, options, output_threshold)?;
        }
    }
    Ok(())
}

fn emit(
    registry: &DigestRegistry,
    first: usize,
    second: usize,
    options: &CompareOptions,
    output_threshold: i32,
) -> Result<()> {
    let (score, swapped) = registry.compare(first, second, options)?;
    if score >= output_threshold {
        let (name_a, name_b) = if swapped {
            (registry.name(second), registry.name(first))
        } else {
            (registry.name(first), registry.name(second))
        };
        println!(
            "{}|{}|{score:03}",
            name_a.unwrap_or_default(),
            name_b.unwrap_or_default()
        );
    }
    Ok(())
}
