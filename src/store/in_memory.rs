//! InMemoryLockStore - HashMap-backed lock store for tests and single-node use.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{LockStore, StoreError, Versioned};
use crate::lock::LockState;

const NAMESPACE: &str = "locks";

/// Internal stored representation of a lock.
struct StoredLock {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory lock store backed by a HashMap.
///
/// Storage key is `"locks:id"`. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryLockStore {
    storage: Arc<RwLock<HashMap<String, StoredLock>>>,
}

impl Default for InMemoryLockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLockStore {
    /// Create a new empty lock store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored lock records, expired ones included.
    pub fn len(&self) -> Result<usize, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn make_key(id: &str) -> String {
        format!("{}:{}", NAMESPACE, id)
    }
}

impl LockStore for InMemoryLockStore {
    fn get(&self, id: &str) -> Result<Option<Versioned<LockState>>, StoreError> {
        let key = Self::make_key(id);
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        match storage.get(&key) {
            Some(stored) => {
                let data: LockState = serde_json::from_slice(&stored.bytes)?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn put(&self, lock: &LockState) -> Result<Versioned<LockState>, StoreError> {
        let key = Self::make_key(lock.id());
        let bytes = serde_json::to_vec(lock)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let new_version = storage.get(&key).map(|s| s.version + 1).unwrap_or(1);

        storage.insert(
            key,
            StoredLock {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: lock.clone(),
            version: new_version,
        })
    }

    fn insert(&self, lock: &LockState) -> Result<Versioned<LockState>, StoreError> {
        let key = Self::make_key(lock.id());
        let bytes = serde_json::to_vec(lock)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        if let Some(existing) = storage.get(&key) {
            return Err(StoreError::Conflict {
                id: lock.id().to_string(),
                expected: 0,
                actual: existing.version,
            });
        }

        storage.insert(key, StoredLock { bytes, version: 1 });

        Ok(Versioned {
            data: lock.clone(),
            version: 1,
        })
    }

    fn update(
        &self,
        lock: &LockState,
        expected_version: u64,
    ) -> Result<Versioned<LockState>, StoreError> {
        let key = Self::make_key(lock.id());
        let bytes = serde_json::to_vec(lock)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let actual_version = storage
            .get(&key)
            .map(|s| s.version)
            .ok_or_else(|| StoreError::NotFound {
                id: lock.id().to_string(),
            })?;

        if actual_version != expected_version {
            return Err(StoreError::Conflict {
                id: lock.id().to_string(),
                expected: expected_version,
                actual: actual_version,
            });
        }

        let new_version = actual_version + 1;
        storage.insert(
            key,
            StoredLock {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: lock.clone(),
            version: new_version,
        })
    }
}
