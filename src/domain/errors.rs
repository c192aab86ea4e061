//! Domain error types
//!
//! This module defines the error hierarchy for PhiGuard. Only configuration,
//! catalog and audit storage failures are allowed to surface as hard errors;
//! reviewer failures are recoverable and degrade to local-only redaction.

use thiserror::Error;

/// Main PhiGuard error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum PhiGuardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed detector definitions in a pattern library
    #[error("Pattern catalog error: {0}")]
    Catalog(String),

    /// Audit log storage errors
    #[error("Audit log error: {0}")]
    Audit(#[from] AuditError),

    /// Reviewer gateway errors
    #[error("Reviewer error: {0}")]
    Reviewer(#[from] ReviewerError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Reviewer gateway errors
///
/// Errors that occur when escalating text to the external reviewer.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewerError {
    /// No credential configured; enhancement should be skipped
    #[error("Reviewer unavailable: {0}")]
    Unavailable(String),

    /// Network, HTTP status or timeout failure
    #[error("Reviewer transport error: {0}")]
    Transport(String),

    /// The reviewer answered but the structured response was unusable
    #[error("Reviewer response could not be parsed: {0}")]
    Parse(String),

    /// The caller abandoned the request
    #[error("Reviewer request cancelled")]
    Cancelled,
}

impl ReviewerError {
    /// Short machine-readable kind, used in audit details
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Audit log storage errors
///
/// A silent audit gap is itself a compliance violation, so these are always
/// reported to the caller.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The log cannot make room for the incoming entries
    #[error("Audit storage exhausted: {0}")]
    StorageExhausted(String),

    /// Durable sink write failed
    #[error("Audit storage failure: {0}")]
    Storage(String),

    /// Entry could not be serialized or parsed
    #[error("Audit serialization failure: {0}")]
    Serialization(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for PhiGuardError {
    fn from(err: std::io::Error) -> Self {
        PhiGuardError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PhiGuardError {
    fn from(err: serde_json::Error) -> Self {
        PhiGuardError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PhiGuardError {
    fn from(err: toml::de::Error) -> Self {
        PhiGuardError::Configuration(format!("TOML parse error: {err}"))
    }
}
