//! Retry Errors

use thiserror::Error;

use crate::error::{ErrorKind, RemoteError};

/// Result type for retried operations
pub type RetryResult<T> = Result<T, RetryError>;

/// Terminal outcome of a retried operation that did not succeed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryError {
    /// The operation failed with a code outside the retryable set
    #[error("non-retryable error on attempt {attempt}: {source}")]
    Fatal {
        attempt: u32,
        #[source]
        source: RemoteError,
    },

    /// Every attempt failed with a retryable code
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: RemoteError,
    },

    /// The backoff policy itself is unusable
    #[error("invalid backoff policy: {0}")]
    InvalidPolicy(String),
}

impl RetryError {
    /// Number of times the operation was invoked
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Fatal { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::InvalidPolicy(_) => 0,
        }
    }

    /// The last remote error observed, if any call was made
    pub fn last_error(&self) -> Option<&RemoteError> {
        match self {
            RetryError::Fatal { source, .. } => Some(source),
            RetryError::Exhausted { last, .. } => Some(last),
            RetryError::InvalidPolicy(_) => None,
        }
    }

    /// Exhaustion counts as fatal: the caller must not loop on it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RetryError::InvalidPolicy(_) => ErrorKind::Validation,
            RetryError::Fatal { .. } | RetryError::Exhausted { .. } => ErrorKind::FatalRemote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteErrorCode;

    #[test]
    fn test_exhausted_is_fatal() {
        let err = RetryError::Exhausted {
            attempts: 10,
            last: RemoteError::new(RemoteErrorCode::AuthFailure, "not yet"),
        };
        assert_eq!(err.kind(), ErrorKind::FatalRemote);
        assert_eq!(err.attempts(), 10);
        assert!(err.to_string().contains("gave up after 10 attempts"));
    }

    #[test]
    fn test_fatal_keeps_source() {
        let err = RetryError::Fatal {
            attempt: 1,
            source: RemoteError::new(RemoteErrorCode::AllocationNotFound, "gone"),
        };
        assert_eq!(
            err.last_error().map(|e| &e.code),
            Some(&RemoteErrorCode::AllocationNotFound)
        );
    }
}
