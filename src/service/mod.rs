//! Lock service - the operations the transport layer calls.
//!
//! `LockService<S, C>` holds an explicit store handle and clock. Each
//! mutating call loads the lock, checks the key, applies the transition and
//! writes the result back with a version check, retrying on conflict.
//!
//! ## Quick Start
//!
//! ```
//! use lock_states::{InMemoryLockStore, LockService, NewLock, ServiceError};
//!
//! let service = LockService::new(InMemoryLockStore::new());
//! let lock = service.create_new(NewLock::new())?;
//!
//! assert!(service.lock_by_id_and_key(lock.id(), lock.key(), Some(600))?);
//! assert!(service.is_locked(lock.id())?);
//! assert_eq!(
//!     service.unlock(lock.id(), "wrong key"),
//!     Err(ServiceError::Unauthorized)
//! );
//! # Ok::<(), ServiceError>(())
//! ```

mod error;
mod lock_service;

pub use error::ServiceError;
pub use lock_service::{normalize_id, LockService, LockStatus, NewLock, DEFAULT_MAX_ATTEMPTS};
