// [libs/infra/mapfile/src/errors.rs]
//! Failure catalog for input mapping. Every variant is a skip condition for
//! the hashing pipeline: the offending file is left out and processing
//! continues.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapFileError {
    #[error("could not open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} is not a regular file")]
    NotRegular { path: PathBuf },

    #[error("file {path:?} too small ({size} bytes)")]
    TooSmall { path: PathBuf, size: u64 },

    #[error("could not map {path:?}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
