//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::address::AddressError;
use crate::error::ErrorKind;
use crate::mapping::MappingError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, state files)
    IoError,
    /// Address allocation or release failed
    AddressFailed,
    /// Identity mapping convergence failed
    MappingFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLUSTERWARD_CLI_CONFIG_ERROR",
            Self::IoError => "CLUSTERWARD_CLI_IO_ERROR",
            Self::AddressFailed => "CLUSTERWARD_CLI_ADDRESS_FAILED",
            Self::MappingFailed => "CLUSTERWARD_CLI_MAPPING_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    kind: Option<ErrorKind>,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: None,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Classification of the underlying reconciliation error, if any
    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{} [{}]: {}", self.code.code(), kind, self.message),
            None => write!(f, "{}: {}", self.code.code(), self.message),
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<AddressError> for CliError {
    fn from(e: AddressError) -> Self {
        Self {
            code: CliErrorCode::AddressFailed,
            kind: Some(e.kind()),
            message: e.to_string(),
        }
    }
}

impl From<MappingError> for CliError {
    fn from(e: MappingError) -> Self {
        Self {
            code: CliErrorCode::MappingFailed,
            kind: Some(e.kind()),
            message: e.to_string(),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
