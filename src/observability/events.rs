//! Observable events
//!
//! Every log record emitted by the crate names one of these events.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Address allocation
    /// Allocation requested
    AllocateStart,
    /// Address allocated and tagged
    AddressAllocated,
    /// Address allocated but tagging failed
    AddressTagFailed,

    // Address release
    /// Release of a cluster's addresses begins
    ReleaseStart,
    /// A retryable failure was absorbed; another attempt follows
    RetryScheduled,
    /// One address released
    AddressReleased,
    /// Release batch aborted
    ReleaseAborted,
    /// All addresses released
    ReleaseComplete,

    // Identity mappings
    /// Convergence of a desired mapping begins
    MappingConvergeStart,
    /// Equivalent mapping already present
    MappingUnchanged,
    /// New mapping record created
    MappingCreated,
    /// Desired mapping rejected (validation or store failure)
    MappingRejected,

    /// End-of-run counters
    RunSummary,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::AllocateStart => "ALLOCATE_BEGIN",
            Event::AddressAllocated => "ADDRESS_ALLOCATED",
            Event::AddressTagFailed => "ADDRESS_TAG_FAILED",

            Event::ReleaseStart => "RELEASE_BEGIN",
            Event::RetryScheduled => "RETRY_SCHEDULED",
            Event::AddressReleased => "ADDRESS_RELEASED",
            Event::ReleaseAborted => "RELEASE_ABORTED",
            Event::ReleaseComplete => "RELEASE_COMPLETE",

            Event::MappingConvergeStart => "MAPPING_CONVERGE_BEGIN",
            Event::MappingUnchanged => "MAPPING_UNCHANGED",
            Event::MappingCreated => "MAPPING_CREATED",
            Event::MappingRejected => "MAPPING_REJECTED",

            Event::RunSummary => "RUN_SUMMARY",
        }
    }

    /// Default severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RetryScheduled => Severity::Warn,
            Event::AddressTagFailed | Event::ReleaseAborted | Event::MappingRejected => {
                Severity::Error
            }
            Event::AllocateStart | Event::ReleaseStart | Event::MappingConvergeStart => {
                Severity::Trace
            }
            _ => Severity::Info,
        }
    }

    /// Returns true if this event marks a failed operation
    pub fn is_failure(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
