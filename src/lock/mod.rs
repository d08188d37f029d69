//! Lock state - a single named lock and its transitions.
//!
//! A lock has an immutable id and secret key, a stored `locked` flag and an
//! optional expiry. Whether the lock is *held* is derived at query time from
//! the flag and the expiry; an expired lock keeps its flag but reads as
//! unlocked.
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use lock_states::LockState;
//!
//! let now = Utc::now();
//! let lock = LockState::create(None)?.lock(Some(600), now);
//! assert!(lock.is_locked_at(now));
//!
//! lock.is_valid_key(lock.key())?;
//! let lock = lock.unlock();
//! assert!(!lock.is_locked_at(now));
//! # Ok::<(), lock_states::LockError>(())
//! ```

mod error;
mod state;

pub use error::LockError;
pub use state::{ttl_from_seconds, LockState, MAX_KEY_LEN, NO_EXPIRY};
