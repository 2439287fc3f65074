// [libs/domain/registry/src/lib.rs]
//! Ordered, indexed, bounded collection of similarity digests.
//!
//! Mutations take the exclusive side of one lock; index reads share it and
//! hand out `Arc` clones, so comparison workloads run against a quiesced
//! registry without holding the lock at all.

pub mod errors;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sdhash_core_sdbf::{compare_digests, CompareOptions, Sdbf};
use tracing::debug;

pub use crate::errors::RegistryError;

/// Default digest capacity; a policy bound, not an architectural one.
pub const DEFAULT_CAPACITY: usize = 1_000_000;

/// In-memory digest collection, insertion-ordered and indexable.
#[derive(Debug)]
pub struct DigestRegistry {
    digests: RwLock<Vec<Arc<Sdbf>>>,
    capacity: usize,
}

impl Default for DigestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DigestRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            digests: RwLock::new(Vec::new()),
            capacity,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Sdbf>>> {
        self.digests.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Sdbf>>> {
        self.digests.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a digest. Returns the new collection size.
    pub fn add(&self, digest: Sdbf) -> Result<usize, RegistryError> {
        let mut digests = self.write();
        if digests.len() >= self.capacity {
            return Err(RegistryError::CapacityExhausted {
                capacity: self.capacity,
            });
        }
        digests.push(Arc::new(digest));
        Ok(digests.len())
    }

    /// Remove the first digest whose name starts with `prefix` and return
    /// the new collection size.
    ///
    /// The prefix is matched over its full length, so several digests may
    /// match a short prefix; only the earliest-inserted one is removed.
    pub fn remove_first_with_prefix(&self, prefix: &str) -> usize {
        let mut digests = self.write();
        if let Some(index) = digests.iter().position(|d| d.name().starts_with(prefix)) {
            let removed = digests.remove(index);
            debug!(name = removed.name(), index, "digest removed");
        }
        digests.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Digest at `index`, if present.
    pub fn get(&self, index: usize) -> Option<Arc<Sdbf>> {
        self.read().get(index).cloned()
    }

    /// Name of the digest at `index`, if present.
    pub fn name(&self, index: usize) -> Option<String> {
        self.read().get(index).map(|d| d.name().to_owned())
    }

    /// Compare the digests at two indices.
    pub fn compare(
        &self,
        first: usize,
        second: usize,
        options: &CompareOptions,
    ) -> Result<(i32, bool), RegistryError> {
        let (a, b) = {
            let digests = self.read();
            let size = digests.len();
            let fetch = |index: usize| {
                digests
                    .get(index)
                    .cloned()
                    .ok_or(RegistryError::IndexOutOfRange { index, size })
            };
            (fetch(first)?, fetch(second)?)
        };
        Ok(compare_digests(&a, &b, options))
    }

    /// First digest scoring at least `threshold` against `query`, with its
    /// index and score.
    pub fn lookup_first_above(
        &self,
        query: &Sdbf,
        threshold: i32,
        options: &CompareOptions,
    ) -> Option<(usize, i32)> {
        let snapshot: Vec<Arc<Sdbf>> = self.read().clone();
        for (index, candidate) in snapshot.iter().enumerate() {
            let (score, _) = compare_digests(query, candidate, options);
            if score >= threshold {
                return Some((index, score));
            }
        }
        None
    }
}
