//! Shared error classification
//!
//! Remote systems report failures as string codes. Those codes are mapped to
//! [`RemoteErrorCode`] exactly once, where the collaborator hands an error
//! back, and everything downstream matches on the enum.

use std::fmt;

use thiserror::Error;

/// Broad error categories every module error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input; never reached the network
    Validation,
    /// Attempted release of an address still bound to a consumer
    SafetyViolation,
    /// Transient remote failure, eligible for retry
    RetryableRemote,
    /// Any other remote failure, or a retry budget that ran out
    FatalRemote,
    /// Allocation succeeded but the ownership tag could not be applied
    PartialTagFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::SafetyViolation => "SAFETY_VIOLATION",
            ErrorKind::RetryableRemote => "RETRYABLE_REMOTE",
            ErrorKind::FatalRemote => "FATAL_REMOTE",
            ErrorKind::PartialTagFailure => "PARTIAL_TAG_FAILURE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error codes reported by the address provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteErrorCode {
    /// Credentials not yet valid or propagated
    AuthFailure,
    /// Address still in use right after disassociation
    InvalidIpAddressInUse,
    /// Allocation id does not exist
    AllocationNotFound,
    /// Request rejected as malformed
    InvalidParameter,
    /// Caller lacks permission
    UnauthorizedOperation,
    /// Account address quota reached
    AddressLimitExceeded,
    /// Provider is throttling requests
    RequestLimitExceeded,
    /// Any code not listed above, kept verbatim
    Other(String),
    /// The failure carried no code at all (transport, local I/O)
    Unclassified,
}

impl RemoteErrorCode {
    /// Map a provider error code string onto the enumeration.
    pub fn from_code(code: &str) -> Self {
        match code {
            "AuthFailure" => RemoteErrorCode::AuthFailure,
            "InvalidIPAddress.InUse" => RemoteErrorCode::InvalidIpAddressInUse,
            "InvalidAllocationID.NotFound" => RemoteErrorCode::AllocationNotFound,
            "InvalidParameterValue" | "InvalidParameterCombination" => {
                RemoteErrorCode::InvalidParameter
            }
            "UnauthorizedOperation" => RemoteErrorCode::UnauthorizedOperation,
            "AddressLimitExceeded" => RemoteErrorCode::AddressLimitExceeded,
            "RequestLimitExceeded" => RemoteErrorCode::RequestLimitExceeded,
            "" => RemoteErrorCode::Unclassified,
            other => RemoteErrorCode::Other(other.to_string()),
        }
    }

    /// The provider's code string.
    pub fn as_str(&self) -> &str {
        match self {
            RemoteErrorCode::AuthFailure => "AuthFailure",
            RemoteErrorCode::InvalidIpAddressInUse => "InvalidIPAddress.InUse",
            RemoteErrorCode::AllocationNotFound => "InvalidAllocationID.NotFound",
            RemoteErrorCode::InvalidParameter => "InvalidParameterValue",
            RemoteErrorCode::UnauthorizedOperation => "UnauthorizedOperation",
            RemoteErrorCode::AddressLimitExceeded => "AddressLimitExceeded",
            RemoteErrorCode::RequestLimitExceeded => "RequestLimitExceeded",
            RemoteErrorCode::Other(code) => code,
            RemoteErrorCode::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for RemoteErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failure returned by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct RemoteError {
    pub code: RemoteErrorCode,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: RemoteErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build from a raw provider code string.
    pub fn from_provider(code: &str, message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::from_code(code), message)
    }

    /// A failure without a provider code.
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::Unclassified, message)
    }
}

/// Result type for remote collaborator calls
pub type RemoteResult<T> = Result<T, RemoteError>;
