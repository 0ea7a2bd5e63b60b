//! Retry executor
//!
//! Runs an operation until it succeeds, fails with a code outside the
//! retryable set, or the policy runs out of steps. Sleeping is delegated to a
//! [`Sleeper`] so tests never wait on the wall clock.

use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::error::{RemoteErrorCode, RemoteResult};
use crate::observability::{log_event_with_fields, Event};

use super::backoff::BackoffPolicy;
use super::errors::{RetryError, RetryResult};

/// Explicit set of error codes that may be retried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryableCodes {
    codes: HashSet<RemoteErrorCode>,
}

impl RetryableCodes {
    pub fn new<I: IntoIterator<Item = RemoteErrorCode>>(codes: I) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// No code is retryable.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: &RemoteErrorCode) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Blocks the current caller for a backoff delay.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        thread::sleep(delay);
    }
}

/// Records requested delays without sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|delays| delays.clone())
            .unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(delay);
        }
    }
}

/// Runs an operation under a backoff policy.
///
/// On success returns the number of invocations it took.
pub trait RetryExecutor: Send + Sync {
    fn run(
        &self,
        operation: &mut dyn FnMut() -> RemoteResult<()>,
        policy: &BackoffPolicy,
        retryable: &RetryableCodes,
    ) -> RetryResult<u32>;
}

/// Default blocking executor.
#[derive(Debug, Default)]
pub struct BackoffExecutor<S: Sleeper = ThreadSleeper> {
    sleeper: S,
}

impl BackoffExecutor<ThreadSleeper> {
    pub fn new() -> Self {
        Self {
            sleeper: ThreadSleeper,
        }
    }
}

impl<S: Sleeper> BackoffExecutor<S> {
    pub fn with_sleeper(sleeper: S) -> Self {
        Self { sleeper }
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }
}

impl<S: Sleeper> RetryExecutor for BackoffExecutor<S> {
    fn run(
        &self,
        operation: &mut dyn FnMut() -> RemoteResult<()>,
        policy: &BackoffPolicy,
        retryable: &RetryableCodes,
    ) -> RetryResult<u32> {
        policy.validate()?;

        let mut rng = rand::thread_rng();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match operation() {
                Ok(()) => return Ok(attempt),
                Err(err) => err,
            };

            if !retryable.contains(&err.code) {
                return Err(RetryError::Fatal {
                    attempt,
                    source: err,
                });
            }
            if attempt >= policy.steps {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            let delay = policy.delay(attempt - 1, &mut rng);
            let attempt_str = attempt.to_string();
            let delay_ms = delay.as_millis().to_string();
            log_event_with_fields(
                Event::RetryScheduled,
                &[
                    ("attempt", attempt_str.as_str()),
                    ("code", err.code.as_str()),
                    ("delay_ms", delay_ms.as_str()),
                ],
            );
            self.sleeper.sleep(delay);
        }
    }
}
