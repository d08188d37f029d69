//! LockStore - abstract keyed storage for lock records.

use std::sync::Arc;

use super::{StoreError, Versioned};
use crate::lock::LockState;

/// Abstract keyed storage for lock records.
///
/// Ids passed in are expected to be normalized by the caller. A missing
/// record is `Ok(None)`, never an error.
pub trait LockStore: Send + Sync {
    /// Get a lock by id. Returns None if not found.
    fn get(&self, id: &str) -> Result<Option<Versioned<LockState>>, StoreError>;

    /// Upsert a lock (insert or overwrite, no version check).
    fn put(&self, lock: &LockState) -> Result<Versioned<LockState>, StoreError>;

    /// Insert a new lock. Fails with `Conflict` if the id already exists.
    fn insert(&self, lock: &LockState) -> Result<Versioned<LockState>, StoreError>;

    /// Overwrite an existing lock only if its stored version is still
    /// `expected_version`.
    fn update(
        &self,
        lock: &LockState,
        expected_version: u64,
    ) -> Result<Versioned<LockState>, StoreError>;
}

impl<S: LockStore + ?Sized> LockStore for Arc<S> {
    fn get(&self, id: &str) -> Result<Option<Versioned<LockState>>, StoreError> {
        (**self).get(id)
    }

    fn put(&self, lock: &LockState) -> Result<Versioned<LockState>, StoreError> {
        (**self).put(lock)
    }

    fn insert(&self, lock: &LockState) -> Result<Versioned<LockState>, StoreError> {
        (**self).insert(lock)
    }

    fn update(
        &self,
        lock: &LockState,
        expected_version: u64,
    ) -> Result<Versioned<LockState>, StoreError> {
        (**self).update(lock, expected_version)
    }
}
