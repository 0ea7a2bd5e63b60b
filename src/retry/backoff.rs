//! Exponential backoff schedule
//!
//! The delay before retry `n` (0-based) is `initial * factor^n`, capped at
//! `max_delay_ms` when set, plus a random jitter of up to `jitter * delay`.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::{RetryError, RetryResult};

/// Backoff schedule handed to a [`RetryExecutor`](super::RetryExecutor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Growth factor applied after each retry
    #[serde(default = "default_factor")]
    pub factor: f64,

    /// Maximum extra random fraction added to each delay, 0.0 to 1.0
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Maximum number of invocations, including the first
    #[serde(default = "default_steps")]
    pub steps: u32,

    /// Upper bound on a single delay before jitter
    #[serde(default)]
    pub max_delay_ms: Option<u64>,
}

fn default_initial_delay_ms() -> u64 {
    500
}
fn default_factor() -> f64 {
    1.5
}
fn default_jitter() -> f64 {
    0.4
}
fn default_steps() -> u32 {
    10
}

impl Default for BackoffPolicy {
    /// 500ms, x1.5, 10 steps: roughly 40s of waiting in total.
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            factor: default_factor(),
            jitter: default_jitter(),
            steps: default_steps(),
            max_delay_ms: None,
        }
    }
}

impl BackoffPolicy {
    /// A policy with no jitter, mostly useful for tests.
    pub fn fixed_steps(initial_delay_ms: u64, factor: f64, steps: u32) -> Self {
        Self {
            initial_delay_ms,
            factor,
            jitter: 0.0,
            steps,
            max_delay_ms: None,
        }
    }

    pub fn validate(&self) -> RetryResult<()> {
        if self.steps == 0 {
            return Err(RetryError::InvalidPolicy("steps must be >= 1".into()));
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(RetryError::InvalidPolicy(format!(
                "factor must be >= 1.0, got {}",
                self.factor
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(RetryError::InvalidPolicy(format!(
                "jitter must be within 0.0..=1.0, got {}",
                self.jitter
            )));
        }
        if let Some(max) = self.max_delay_ms {
            if max < self.initial_delay_ms {
                return Err(RetryError::InvalidPolicy(
                    "max_delay_ms must not be below initial_delay_ms".into(),
                ));
            }
        }
        Ok(())
    }

    /// Delay before retry `retry` without jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let exp = i32::try_from(retry).unwrap_or(i32::MAX);
        let mut millis = self.initial_delay_ms as f64 * self.factor.powi(exp);
        if let Some(max) = self.max_delay_ms {
            millis = millis.min(max as f64);
        }
        let nanos = (millis * 1_000_000.0).round();
        Duration::from_nanos(nanos.clamp(0.0, u64::MAX as f64) as u64)
    }

    /// Delay before retry `retry`, jitter included.
    pub fn delay<R: Rng + ?Sized>(&self, retry: u32, rng: &mut R) -> Duration {
        let base = self.base_delay(retry);
        if self.jitter <= 0.0 {
            return base;
        }
        let extra = base.as_secs_f64() * self.jitter * rng.gen::<f64>();
        let extra = Duration::try_from_secs_f64(extra).unwrap_or(Duration::MAX);
        base.saturating_add(extra)
    }

    /// Total time slept if every attempt fails, jitter excluded.
    pub fn total_budget(&self) -> Duration {
        (0..self.steps.saturating_sub(1))
            .map(|retry| self.base_delay(retry))
            .sum()
    }
}
