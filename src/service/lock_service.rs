//! Lock service - load, validate, transition and save against a lock store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::ServiceError;
use crate::clock::{Clock, SystemClock};
use crate::lock::LockState;
use crate::store::{LockStore, StoreError, Versioned};

/// Default number of load/transition/save cycles before giving up on a
/// contended lock.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Lock ids are case-insensitive.
pub fn normalize_id(id: &str) -> String {
    id.to_lowercase()
}

/// Options for [`LockService::create_new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLock {
    /// Lock immediately after creation.
    pub locked: bool,
    /// TTL applied when `locked` is set. `None` never expires.
    pub ttl_seconds: Option<u64>,
    /// Caller-chosen secret; a random one is generated when absent.
    pub key: Option<String>,
}

impl NewLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locked(mut self, ttl_seconds: Option<u64>) -> Self {
        self.locked = true;
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Read-only view of a lock. Never carries the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub lock_id: String,
    pub is_locked: bool,
    /// Expiry of a held lock; `None` for permanent or released locks.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Orchestrates lock transitions against a [`LockStore`].
///
/// Every mutation is a compare-and-swap on the stored version; when another
/// writer got there first the whole cycle is re-run, up to `max_attempts`.
pub struct LockService<S, C = SystemClock> {
    store: S,
    clock: C,
    max_attempts: u32,
}

impl<S: LockStore> LockService<S> {
    /// Create a service over `store` using the wall clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl<S: LockStore, C: Clock> LockService<S, C> {
    /// Swap the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> LockService<S, C2> {
        LockService {
            store: self.store,
            clock,
            max_attempts: self.max_attempts,
        }
    }

    /// Set the retry budget for contended writes. At least one attempt is
    /// always made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Create and persist a new lock.
    ///
    /// The returned state carries the secret key; this is the only place it
    /// is handed out.
    pub fn create_new(&self, new: NewLock) -> Result<LockState, ServiceError> {
        let mut lock = LockState::create(new.key)?;
        if new.locked {
            lock = lock.lock(new.ttl_seconds, self.clock.now());
        }

        let saved = self.store.insert(&lock)?;
        info!(
            lock_id = %saved.data.id(),
            locked = new.locked,
            ttl_seconds = ?new.ttl_seconds,
            "lock created"
        );
        Ok(saved.data)
    }

    /// Lock with the given key. Returns whether the lock is held afterwards.
    pub fn lock_by_id_and_key(
        &self,
        id: &str,
        key: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<bool, ServiceError> {
        self.mutate("lock", id, key, |lock, now| lock.lock(ttl_seconds, now))
    }

    pub fn unlock(&self, id: &str, key: &str) -> Result<bool, ServiceError> {
        self.mutate("unlock", id, key, |lock, _| lock.unlock())
    }

    pub fn toggle(&self, id: &str, key: &str) -> Result<bool, ServiceError> {
        self.mutate("toggle", id, key, |lock, now| lock.toggle(now))
    }

    /// Whether the lock is held right now. Read-only.
    pub fn is_locked(&self, id: &str) -> Result<bool, ServiceError> {
        let lock = self.load(&normalize_id(id))?;
        Ok(lock.data.is_locked_at(self.clock.now()))
    }

    /// Read-only view backing `GET /locks/:lock_id/status`.
    pub fn status(&self, id: &str) -> Result<LockStatus, ServiceError> {
        let lock = self.load(&normalize_id(id))?.data;
        let is_locked = lock.is_locked_at(self.clock.now());
        Ok(LockStatus {
            lock_id: lock.id().to_string(),
            is_locked,
            expires_at: lock.expires_at().filter(|_| is_locked),
        })
    }

    fn load(&self, id: &str) -> Result<Versioned<LockState>, ServiceError> {
        self.store
            .get(id)?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    fn mutate<F>(
        &self,
        op: &'static str,
        id: &str,
        key: &str,
        transition: F,
    ) -> Result<bool, ServiceError>
    where
        F: Fn(LockState, DateTime<Utc>) -> LockState,
    {
        let id = normalize_id(id);

        for attempt in 1..=self.max_attempts {
            let current = self.load(&id)?;
            if let Err(e) = current.data.is_valid_key(key) {
                warn!(lock_id = %id, op, "rejected: key is not valid");
                return Err(e.into());
            }

            let now = self.clock.now();
            let next = transition(current.data, now);
            let held = next.is_locked_at(now);

            match self.store.update(&next, current.version) {
                Ok(saved) => {
                    debug!(
                        lock_id = %id,
                        op,
                        held,
                        version = saved.version,
                        "lock updated"
                    );
                    return Ok(held);
                }
                Err(StoreError::Conflict { expected, actual, .. }) => {
                    debug!(
                        lock_id = %id,
                        op,
                        attempt,
                        expected,
                        actual,
                        "write conflict, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            lock_id = %id,
            op,
            attempts = self.max_attempts,
            "giving up after repeated write conflicts"
        );
        Err(ServiceError::Conflict {
            id,
            attempts: self.max_attempts,
        })
    }
}
