//! Error types for lock service operations.

use thiserror::Error;

use crate::lock::LockError;
use crate::store::StoreError;

/// Error type for lock service operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Malformed input at creation (bad custom key).
    #[error("invalid lock key: {0}")]
    InvalidKey(String),
    /// Supplied key does not match the lock's key.
    #[error("key is not valid")]
    Unauthorized,
    /// No lock with this id.
    #[error("lock not found: {0}")]
    NotFound(String),
    /// Concurrent writers kept winning until the retry budget ran out.
    #[error("lock {id} changed concurrently, gave up after {attempts} attempts")]
    Conflict { id: String, attempts: u32 },
    /// Store error.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<LockError> for ServiceError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::InvalidKey(msg) => ServiceError::InvalidKey(msg),
            LockError::Unauthorized => ServiceError::Unauthorized,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => ServiceError::NotFound(id),
            StoreError::Conflict { id, .. } => ServiceError::Conflict { id, attempts: 1 },
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidKey(_) => 400,
            ServiceError::Unauthorized => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict { .. } => 409,
            ServiceError::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_errors_convert() {
        assert_eq!(
            ServiceError::from(LockError::Unauthorized),
            ServiceError::Unauthorized
        );
        assert_eq!(
            ServiceError::from(LockError::InvalidKey("empty".into())),
            ServiceError::InvalidKey("empty".into())
        );
    }

    #[test]
    fn store_errors_convert() {
        let not_found = StoreError::NotFound { id: "abc".into() };
        assert_eq!(
            ServiceError::from(not_found),
            ServiceError::NotFound("abc".into())
        );

        let io = StoreError::Io("disk full".into());
        assert_eq!(
            ServiceError::from(io.clone()),
            ServiceError::Store(io)
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(ServiceError::InvalidKey(String::new()).status_code(), 400);
        assert_eq!(ServiceError::Unauthorized.status_code(), 401);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), 404);
        assert_eq!(
            ServiceError::Conflict {
                id: "x".into(),
                attempts: 3
            }
            .status_code(),
            409
        );
        assert_eq!(
            ServiceError::Store(StoreError::Storage("down".into())).status_code(),
            500
        );
    }

    #[test]
    fn messages_never_carry_keys() {
        assert_eq!(ServiceError::Unauthorized.to_string(), "key is not valid");
        assert_eq!(
            ServiceError::NotFound("01hv".into()).to_string(),
            "lock not found: 01hv"
        );
    }
}
