// [apps/sdhash/src/cli.rs]
//! Command-line surface and option validation. All validation happens
//! before any hashing or loading starts.

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use sdhash_core_sdbf::params::MAX_THREADS;
use sdhash_core_sdbf::CompareOptions;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "sdhash",
    version,
    about = "Generate base64-encoded similarity digests for files and compare them."
)]
pub struct CommandArguments {
    /// 'all-gen' mode: generate digests, then compare all pairs.
    #[arg(short = 'g', conflicts_with = "compare")]
    pub generate_compare: bool,

    /// 'comp' mode: load digests from a file and compare all pairs, or,
    /// with two files, compare the first file's digests against the
    /// second's.
    #[arg(short = 'c')]
    pub compare: bool,

    /// Hash in block (dd) mode with the given block size in KiB.
    #[arg(short = 'b', value_name = "KIB", conflicts_with = "compare")]
    pub block_size_kib: Option<u32>,

    /// Parallelization factor.
    #[arg(short = 'p', value_name = "1-512", default_value_t = 1)]
    pub thread_count: u32,

    /// Only print comparison results at or above this score.
    #[arg(short = 't', value_name = "0-100", default_value_t = 1)]
    pub output_threshold: i32,

    /// For -c comparisons, consider at most N filters per reference digest.
    #[arg(short = 's', value_name = "1-16")]
    pub sample_size: Option<u32>,

    /// Show a heat map of per-filter matches (requires -p 1).
    #[arg(short = 'm')]
    pub heat_map: bool,

    /// Warn about skipped inputs.
    #[arg(short = 'w')]
    pub warnings: bool,

    /// Files to hash, or digest files with -c.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

impl CommandArguments {
    /// Enforce option ranges and combinations; fatal before any work.
    pub fn validate(mut self) -> anyhow::Result<Self> {
        if self.thread_count < 1 || self.thread_count > MAX_THREADS {
            bail!("parallelization factor must be between 1 and {MAX_THREADS}");
        }
        if !(0..=100).contains(&self.output_threshold) {
            warn!(
                threshold = self.output_threshold,
                "invalid output threshold, resetting to 1"
            );
            self.output_threshold = 1;
        }
        if let Some(sample) = self.sample_size {
            if !(1..=16).contains(&sample) {
                bail!("sample size must be between 1 and 16");
            }
        }
        if let Some(kib) = self.block_size_kib {
            if kib == 0 {
                bail!("block size must be at least 1 KiB");
            }
        }
        if self.heat_map && self.thread_count > 1 {
            bail!("the heat map is only available without parallelism (-p 1)");
        }
        if self.compare && self.files.len() > 2 {
            bail!("-c takes one digest file, or a query file and a target file");
        }
        Ok(self)
    }

    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            thread_count: self.thread_count,
            // Sampling only applies to loaded-digest comparisons.
            sample_size: if self.compare {
                self.sample_size.unwrap_or(0)
            } else {
                0
            },
            heat_map: self.heat_map,
        }
    }
}
