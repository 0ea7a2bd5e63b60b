//! Bounded retry with exponential backoff
//!
//! Callers hand an operation, a [`BackoffPolicy`] and an explicit set of
//! retryable [`RemoteErrorCode`](crate::error::RemoteErrorCode)s to a
//! [`RetryExecutor`]. Codes outside the set abort on the first occurrence;
//! running out of steps returns the last error.

pub mod backoff;
pub mod errors;
pub mod executor;

pub use backoff::BackoffPolicy;
pub use errors::{RetryError, RetryResult};
pub use executor::{
    BackoffExecutor, RecordingSleeper, RetryExecutor, RetryableCodes, Sleeper, ThreadSleeper,
};
