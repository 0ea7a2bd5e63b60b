//! Reconciliation counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Relaxed atomics; exactness across threads is not required

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by the address manager and mapping engine.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    addresses_allocated: AtomicU64,
    tag_failures: AtomicU64,
    addresses_released: AtomicU64,
    release_retries: AtomicU64,
    release_failures: AtomicU64,
    mappings_created: AtomicU64,
    mappings_unchanged: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Address metrics

    pub fn increment_addresses_allocated(&self) {
        self.addresses_allocated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tag_failures(&self) {
        self.tag_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_addresses_released(&self) {
        self.addresses_released.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` absorbed retryable failures
    pub fn add_release_retries(&self, count: u64) {
        self.release_retries.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_release_failures(&self) {
        self.release_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Mapping metrics

    pub fn increment_mappings_created(&self) {
        self.mappings_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_mappings_unchanged(&self) {
        self.mappings_unchanged.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            addresses_allocated: self.addresses_allocated.load(Ordering::Relaxed),
            tag_failures: self.tag_failures.load(Ordering::Relaxed),
            addresses_released: self.addresses_released.load(Ordering::Relaxed),
            release_retries: self.release_retries.load(Ordering::Relaxed),
            release_failures: self.release_failures.load(Ordering::Relaxed),
            mappings_created: self.mappings_created.load(Ordering::Relaxed),
            mappings_unchanged: self.mappings_unchanged.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub addresses_allocated: u64,
    pub tag_failures: u64,
    pub addresses_released: u64,
    pub release_retries: u64,
    pub release_failures: u64,
    pub mappings_created: u64,
    pub mappings_unchanged: u64,
}

impl MetricsSnapshot {
    /// Flatten into `(name, value)` pairs for the structured logger.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("addresses_allocated", self.addresses_allocated.to_string()),
            ("addresses_released", self.addresses_released.to_string()),
            ("mappings_created", self.mappings_created.to_string()),
            ("mappings_unchanged", self.mappings_unchanged.to_string()),
            ("release_failures", self.release_failures.to_string()),
            ("release_retries", self.release_retries.to_string()),
            ("tag_failures", self.tag_failures.to_string()),
        ]
    }
}
