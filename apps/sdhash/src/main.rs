// [apps/sdhash/src/main.rs]
//! Command-line entry point: validate options, hash or load digests, then
//! print digests or comparison results to stdout. Telemetry goes to
//! stderr so stdout stays machine-readable.

use anyhow::Result;
use clap::Parser;
use sdhash::cli::CommandArguments;
use sdhash::services::{comparison, hashing};
use sdhash_core_sdbf::codec;
use sdhash_domain_registry::DigestRegistry;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let arguments = CommandArguments::parse().validate()?;
    let registry = DigestRegistry::new();

    if arguments.compare {
        return comparison::run_compare_mode(&arguments, &registry);
    }

    let hashed = hashing::hash_inputs(&arguments, &registry);
    debug!(hashed, "inputs hashed");

    if arguments.generate_compare {
        comparison::compare_all_pairs(
            &registry,
            &arguments.compare_options(),
            arguments.output_threshold,
        )
    } else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for index in 0..registry.len() {
            if let Some(digest) = registry.get(index) {
                codec::write_digest(&mut out, &digest)?;
            }
        }
        Ok(())
    }
}
