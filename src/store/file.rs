//! FileLockStore - one JSON document per lock on the local filesystem.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{LockStore, StoreError, Versioned};
use crate::lock::LockState;

/// On-disk representation of a lock.
#[derive(Serialize, Deserialize)]
struct StoredLock {
    version: u64,
    lock: LockState,
}

/// Advisory lock file guarding every write under the store directory.
const WRITE_LOCK_FILE: &str = ".write.lock";

/// Holds the directory write lock; released when dropped.
struct WriteGuard {
    _file: File,
}

/// Lock store that persists each lock as `<dir>/<id>.json`.
///
/// Each write goes to its own temp file that is renamed over the record, so
/// readers never see a partial record. Writes take an exclusive advisory lock
/// on `<dir>/.write.lock`, which serializes the version check and the write
/// across threads, store handles and processes sharing the directory.
#[derive(Clone)]
pub struct FileLockStore {
    dir: PathBuf,
}

impl FileLockStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Ids outside [0-9a-z_-] can never name a stored lock.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let safe = !id.is_empty()
            && id
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
        safe.then(|| self.dir.join(format!("{}.json", id)))
    }

    fn writable_path(&self, lock: &LockState) -> Result<PathBuf, StoreError> {
        self.path_for(lock.id())
            .ok_or_else(|| StoreError::Storage(format!("unsupported lock id: {}", lock.id())))
    }

    // Every call opens its own descriptor; locks held through distinct
    // descriptors exclude each other even inside one process.
    fn lock_writes(&self) -> Result<WriteGuard, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(WRITE_LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(WriteGuard { _file: file })
    }

    fn read(path: &Path) -> Result<Option<StoredLock>, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(
        &self,
        path: &Path,
        lock: &LockState,
        version: u64,
    ) -> Result<Versioned<LockState>, StoreError> {
        let stored = StoredLock {
            version,
            lock: lock.clone(),
        };
        let bytes = serde_json::to_vec(&stored)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(path).map_err(|e| e.error)?;

        Ok(Versioned {
            data: stored.lock,
            version,
        })
    }
}

impl LockStore for FileLockStore {
    fn get(&self, id: &str) -> Result<Option<Versioned<LockState>>, StoreError> {
        let Some(path) = self.path_for(id) else {
            return Ok(None);
        };

        Ok(Self::read(&path)?.map(|stored| Versioned {
            data: stored.lock,
            version: stored.version,
        }))
    }

    fn put(&self, lock: &LockState) -> Result<Versioned<LockState>, StoreError> {
        let path = self.writable_path(lock)?;
        let _guard = self.lock_writes()?;

        let new_version = Self::read(&path)?.map(|s| s.version + 1).unwrap_or(1);
        self.write(&path, lock, new_version)
    }

    fn insert(&self, lock: &LockState) -> Result<Versioned<LockState>, StoreError> {
        let path = self.writable_path(lock)?;
        let _guard = self.lock_writes()?;

        if let Some(existing) = Self::read(&path)? {
            return Err(StoreError::Conflict {
                id: lock.id().to_string(),
                expected: 0,
                actual: existing.version,
            });
        }

        self.write(&path, lock, 1)
    }

    fn update(
        &self,
        lock: &LockState,
        expected_version: u64,
    ) -> Result<Versioned<LockState>, StoreError> {
        let path = self.writable_path(lock)?;
        let _guard = self.lock_writes()?;

        let actual_version = Self::read(&path)?
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

        self.write(&path, lock, actual_version + 1)
    }
}
