//! # Address Errors

use thiserror::Error;

use crate::error::{ErrorKind, RemoteError};
use crate::retry::RetryError;

/// Result type for address lifecycle operations
pub type AddressResult<T> = Result<T, AddressError>;

/// Address lifecycle errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AddressError {
    #[error("invalid cluster name {0:?}")]
    InvalidOwner(String),

    #[error("failed to create elastic IP address: {source}")]
    Allocate {
        #[source]
        source: RemoteError,
    },

    /// The address exists but carries no ownership tag.
    #[error("failed to tag elastic IP {allocation_id:?}: {source}")]
    TagFailed {
        allocation_id: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to describe elastic IPs for cluster {owner:?}: {source}")]
    Describe {
        owner: String,
        #[source]
        source: RemoteError,
    },

    #[error(
        "failed to release elastic IP {public_ip:?} with allocation ID {allocation_id:?}: still associated with association ID {association_id:?}{}",
        not_attempted_suffix(.not_attempted)
    )]
    StillAssociated {
        public_ip: String,
        allocation_id: String,
        association_id: String,
        not_attempted: Vec<String>,
    },

    #[error(
        "failed to release elastic IP {public_ip:?} with allocation ID {allocation_id:?}: {source}{}",
        not_attempted_suffix(.not_attempted)
    )]
    Release {
        public_ip: String,
        allocation_id: String,
        not_attempted: Vec<String>,
        #[source]
        source: RetryError,
    },
}

fn not_attempted_suffix(not_attempted: &[String]) -> String {
    if not_attempted.is_empty() {
        String::new()
    } else {
        format!(" (not attempted: {})", not_attempted.join(", "))
    }
}

impl AddressError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AddressError::InvalidOwner(_) => ErrorKind::Validation,
            AddressError::Allocate { .. } | AddressError::Describe { .. } => {
                ErrorKind::FatalRemote
            }
            AddressError::TagFailed { .. } => ErrorKind::PartialTagFailure,
            AddressError::StillAssociated { .. } => ErrorKind::SafetyViolation,
            AddressError::Release { source, .. } => source.kind(),
        }
    }

    /// Allocation id the error is about, if it concerns a single address.
    pub fn allocation_id(&self) -> Option<&str> {
        match self {
            AddressError::TagFailed { allocation_id, .. }
            | AddressError::StillAssociated { allocation_id, .. }
            | AddressError::Release { allocation_id, .. } => Some(allocation_id),
            _ => None,
        }
    }

    /// Addresses of an aborted release batch that were never tried.
    pub fn not_attempted(&self) -> &[String] {
        match self {
            AddressError::StillAssociated { not_attempted, .. }
            | AddressError::Release { not_attempted, .. } => not_attempted,
            _ => &[],
        }
    }
}
