//! Named, key-authorized, optionally time-bounded locks.
//!
//! A lock is a flag with a secret key and an optional expiry, meant as a
//! mutual-exclusion signal between processes that cannot coordinate
//! directly (CI pipelines, cron jobs). Callers poll; nothing blocks.
//!
//! - [`LockState`] holds a single lock and its pure transitions.
//! - [`LockStore`] is the versioned keyed storage behind it
//!   ([`InMemoryLockStore`], [`FileLockStore`]).
//! - [`LockService`] runs load, key check, transition and compare-and-swap
//!   save cycles against a store.
//! - [`http`] exposes the service over axum (feature `http`).

mod clock;
mod lock;
mod service;
mod store;

#[cfg(feature = "http")]
pub mod config;
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};
pub use lock::{ttl_from_seconds, LockError, LockState, MAX_KEY_LEN, NO_EXPIRY};
pub use service::{
    normalize_id, LockService, LockStatus, NewLock, ServiceError, DEFAULT_MAX_ATTEMPTS,
};
pub use store::{FileLockStore, InMemoryLockStore, LockStore, StoreError, Versioned};
