use thiserror::Error;

/// Error type for lock state transitions and key checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// A caller-supplied key was rejected at creation time.
    #[error("invalid lock key: {0}")]
    InvalidKey(String),
    /// The supplied key does not match the lock's key.
    #[error("key is not valid")]
    Unauthorized,
}
