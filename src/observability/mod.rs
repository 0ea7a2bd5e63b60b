//! Observability for reconciliation runs
//!
//! This module provides:
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Operation counters
//!
//! # Usage
//!
//! ```ignore
//! use clusterward::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::AddressReleased, &[("allocation_id", "eipalloc-1")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_addresses_released();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
