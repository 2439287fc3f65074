// [libs/core/sdbf/src/errors.rs]
//! Failure catalog for digest decoding and digest-file ingestion.

use thiserror::Error;

/// Errors raised while decoding or reading similarity digests.
///
/// Any variant is fatal for the load operation that produced it; generation
/// and comparison never fail through this type.
#[derive(Error, Debug)]
pub enum SdbfError {
    /// Magic prefix or version field outside the supported set.
    #[error("unsupported digest format '{magic}:{version:02}', expecting 'sdbf:02' or 'sdbf-dd:02'")]
    UnsupportedFormat { magic: String, version: u32 },

    /// A colon-delimited header field is missing or unparseable.
    #[error("malformed digest header: {0}")]
    MalformedHeader(String),

    /// The base64 body could not be decoded.
    #[error("digest body is not valid base64: {0}")]
    Body(#[from] base64::DecodeError),

    /// Decoded filter bytes do not match the advertised geometry.
    #[error("decoded filter length {actual}, expected {expected}")]
    FilterLengthMismatch { expected: usize, actual: usize },

    /// Underlying reader failure while ingesting a digest file.
    #[error("digest input could not be read: {0}")]
    Io(#[from] std::io::Error),
}
