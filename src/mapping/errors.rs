//! # Mapping Errors

use thiserror::Error;

use crate::error::ErrorKind;

use super::types::{PrincipalKind, ValidationIssue};

/// Result type for mapping store calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for convergence operations
pub type MappingResult<T> = Result<T, MappingError>;

/// Failures reported by a mapping store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store temporarily unreachable
    #[error("mapping store unavailable: {0}")]
    Unavailable(String),

    /// A record with the same name already exists
    #[error("mapping record already exists: {0}")]
    Conflict(String),

    /// The store rejected the record
    #[error("mapping record rejected: {0}")]
    Invalid(String),

    #[error("mapping store I/O error: {0}")]
    Io(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Convergence errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Never reaches the store
    #[error("invalid {kind} mapping for {principal:?}: {}", join_issues(.issues))]
    Validation {
        kind: PrincipalKind,
        principal: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("getting list of mappings: {source}")]
    List {
        #[source]
        source: StoreError,
    },

    #[error("creating {kind} mapping for {principal:?}: {source}")]
    Create {
        kind: PrincipalKind,
        principal: String,
        #[source]
        source: StoreError,
    },
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl MappingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MappingError::Validation { .. } => ErrorKind::Validation,
            MappingError::List { source } | MappingError::Create { source, .. } => {
                if source.is_retryable() {
                    ErrorKind::RetryableRemote
                } else {
                    ErrorKind::FatalRemote
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_issues() {
        let err = MappingError::Validation {
            kind: PrincipalKind::Role,
            principal: String::new(),
            issues: vec![
                ValidationIssue::PrincipalRequired(PrincipalKind::Role),
                ValidationIssue::UsernameRequired,
            ],
        };
        assert_eq!(
            err.to_string(),
            "invalid role mapping for \"\": role ARN is required; username is required"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_store_error_kinds() {
        let transient = MappingError::List {
            source: StoreError::Unavailable("timeout".into()),
        };
        assert_eq!(transient.kind(), ErrorKind::RetryableRemote);

        let fatal = MappingError::Create {
            kind: PrincipalKind::User,
            principal: "arn:user/bob".into(),
            source: StoreError::Invalid("bad groups".into()),
        };
        assert_eq!(fatal.kind(), ErrorKind::FatalRemote);
    }
}
