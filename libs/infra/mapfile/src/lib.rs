// [libs/infra/mapfile/src/lib.rs]
//! Read-only memory mapping of hashing inputs.
//!
//! Only regular files of at least the caller's minimum size are accepted;
//! everything else is reported as a skip condition for the caller to warn
//! about (or not) and move on.

pub mod errors;

use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};
use tracing::debug;

pub use crate::errors::MapFileError;

/// A file mapped read-only for the lifetime of this value.
#[derive(Debug)]
pub struct MappedFile {
    name: String,
    map: Mmap,
}

impl MappedFile {
    /// Open and map `path`, enforcing the skip policy: the file must exist,
    /// be a regular file, and hold at least `min_size` bytes.
    pub fn open(path: &Path, min_size: u64) -> Result<Self, MapFileError> {
        let file = File::open(path).map_err(|source| MapFileError::Open {
            path: path.to_owned(),
            source,
        })?;
        let metadata = file.metadata().map_err(|source| MapFileError::Open {
            path: path.to_owned(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(MapFileError::NotRegular {
                path: path.to_owned(),
            });
        }
        if metadata.len() < min_size {
            return Err(MapFileError::TooSmall {
                path: path.to_owned(),
                size: metadata.len(),
            });
        }
        // SAFETY: the file descriptor is open read-only and stays owned by
        // the mapping; the input is assumed not to be truncated externally
        // while the digest is being computed.
        let map = unsafe {
            MmapOptions::new()
                .map(&file)
                .map_err(|source| MapFileError::Map {
                    path: path.to_owned(),
                    source,
                })?
        };
        debug!(path = %path.display(), bytes = map.len(), "input mapped");
        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            map,
        })
    }

    /// The path string the file was opened under; doubles as the digest
    /// name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
