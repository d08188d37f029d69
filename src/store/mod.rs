//! Lock stores - keyed persistence for lock records.
//!
//! A store keeps the full lock record under its (already normalized) id and
//! versions every write, so callers can do compare-and-swap updates instead
//! of blind overwrites.
//!
//! Expired locks are never removed by a store: expiry is checked when a
//! record is read, so an expired lock reads back as unlocked rather than
//! missing.
//!
//! ## Example
//!
//! ```
//! use lock_states::{InMemoryLockStore, LockState, LockStore};
//!
//! let store = InMemoryLockStore::new();
//! let lock = LockState::create(None).unwrap();
//! let saved = store.insert(&lock).unwrap();
//! assert_eq!(saved.version, 1);
//!
//! let loaded = store.get(lock.id()).unwrap().unwrap();
//! let next = loaded.data.unlock();
//! store.update(&next, loaded.version).unwrap();
//! ```

mod file;
mod in_memory;
mod store;

use thiserror::Error;

/// A versioned wrapper around a stored record for optimistic concurrency control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for lock store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on lock {id} (expected version {expected}, actual {actual})")]
    Conflict {
        id: String,
        expected: u64,
        actual: u64,
    },
    /// Record not found where one was required.
    #[error("lock not found: {id}")]
    NotFound { id: String },
    /// Serialization/deserialization error.
    #[error("lock serialization error: {0}")]
    Serde(String),
    /// Filesystem error.
    #[error("lock store io error: {0}")]
    Io(String),
    /// Any other storage-level error.
    #[error("lock storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

pub use file::FileLockStore;
pub use in_memory::InMemoryLockStore;
pub use store::LockStore;
