use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use uuid::Uuid;

use super::LockError;

/// Custom keys must be strictly shorter than this many characters.
pub const MAX_KEY_LEN: usize = 256;

/// TTL sentinel used on the wire for "never expires".
pub const NO_EXPIRY: i64 = -1;

/// Convert a wire TTL in seconds into an optional TTL.
///
/// `-1` (or any other negative value) means the lock never expires.
pub fn ttl_from_seconds(seconds: i64) -> Option<u64> {
    u64::try_from(seconds).ok()
}

/// A single named lock.
///
/// Values are immutable: every transition consumes the lock and returns the
/// next state, so a record loaded by one request is never aliased by another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    id: String,
    key: String,
    locked: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    expires_at: Option<DateTime<Utc>>,
}

impl LockState {
    /// Create a new, unlocked lock with a fresh id.
    ///
    /// When `custom_key` is given it becomes the lock's secret; otherwise a
    /// random key is generated.
    pub fn create(custom_key: Option<String>) -> Result<Self, LockError> {
        let key = match custom_key {
            Some(key) => {
                validate_key(&key)?;
                key
            }
            None => Uuid::new_v4().to_string(),
        };

        Ok(LockState {
            id: Ulid::new().to_string().to_lowercase(),
            key,
            locked: false,
            expires_at: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored flag. Use [`LockState::is_locked_at`] to ask whether the
    /// lock is actually held.
    pub fn flag(&self) -> bool {
        self.locked
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Lock, optionally for `ttl_seconds` counted from `now`.
    ///
    /// Re-locking a held lock replaces its expiry.
    pub fn lock(self, ttl_seconds: Option<u64>, now: DateTime<Utc>) -> Self {
        let expires_at = ttl_seconds.map(|ttl| expiry_after(now, ttl));
        LockState {
            locked: true,
            expires_at,
            ..self
        }
    }

    pub fn unlock(self) -> Self {
        LockState {
            locked: false,
            expires_at: None,
            ..self
        }
    }

    /// Flip the held state as observed at `now`.
    ///
    /// A held lock is unlocked. Anything else, including a lock whose flag is
    /// still set but whose expiry has passed, becomes a permanent lock.
    pub fn toggle(self, now: DateTime<Utc>) -> Self {
        if self.is_locked_at(now) {
            self.unlock()
        } else {
            self.lock(None, now)
        }
    }

    /// Whether the lock is held at `now`. The expiry instant itself still
    /// counts as held.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        if !self.locked {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now <= expires_at,
            None => true,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked_at(Utc::now())
    }

    pub fn is_valid_key(&self, supplied: &str) -> Result<(), LockError> {
        if self.key != supplied {
            return Err(LockError::Unauthorized);
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), LockError> {
    if key.is_empty() {
        return Err(LockError::InvalidKey("key must not be empty".into()));
    }
    if key.chars().count() >= MAX_KEY_LEN {
        return Err(LockError::InvalidKey(format!(
            "key must be shorter than {} characters",
            MAX_KEY_LEN
        )));
    }
    Ok(())
}

// Saturates at the latest representable instant.
fn expiry_after(now: DateTime<Utc>, ttl_seconds: u64) -> DateTime<Utc> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
