// [libs/domain/registry/src/errors.rs]
//! Failure catalog for registry mutation and index access.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry reached its configured digest limit.
    #[error("registry capacity of {capacity} digests exhausted")]
    CapacityExhausted { capacity: usize },

    /// An index-based operation referenced a slot that does not exist.
    #[error("digest index {index} out of range (registry holds {size})")]
    IndexOutOfRange { index: usize, size: usize },
}
