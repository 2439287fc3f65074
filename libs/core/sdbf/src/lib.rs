// [libs/core/sdbf/src/lib.rs]
//! Similarity-digest engine.
//!
//! A similarity digest (SDBF) condenses a byte stream into a sequence of
//! 2048-bit Bloom filters holding its statistically rarest 64-byte
//! features; two digests can then be compared for a [0, 100] score of
//! shared content. This crate owns the full pipeline: entropy ranking of
//! sliding windows, popularity scoring, histogram-driven feature budgets,
//! SHA-1 insertion, the tiered-popcount comparator, and the textual record
//! codec. File access, the digest registry and the command surface live in
//! their own crates.

pub mod bloom;
pub mod builder;
pub mod codec;
pub mod compare;
pub mod digest;
pub mod entropy;
pub mod errors;
pub mod params;
pub mod score;
pub mod tables;

pub use builder::{hash_block, hash_buffer, hash_stream};
pub use compare::{compare_digests, CompareOptions};
pub use digest::{Sdbf, Shape};
pub use errors::SdbfError;
pub use params::EngineParams;
