//! Logging and observability
//!
//! Structured logging through `tracing`. Log lines never carry plaintext PHI:
//! redactions are described by category, offsets and counts only.
//!
//! # Example
//!
//! ```no_run
//! use phiguard::logging::init_logging;
//! use phiguard::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the completion of a redaction pass
///
/// # Example
///
/// ```no_run
/// use phiguard::log_redaction_complete;
/// use std::time::Duration;
///
/// log_redaction_complete!(3, 0.85_f32, Duration::from_millis(2));
/// ```
#[macro_export]
macro_rules! log_redaction_complete {
    ($spans:expr, $confidence:expr, $duration:expr) => {
        tracing::debug!(
            spans = $spans,
            confidence = $confidence,
            duration_us = $duration.as_micros() as u64,
            "Redaction completed"
        );
    };
}

/// Log a reviewer failure that degraded to local output
///
/// # Example
///
/// ```no_run
/// use phiguard::log_reviewer_fallback;
///
/// log_reviewer_fallback!("transport", "connection refused");
/// ```
#[macro_export]
macro_rules! log_reviewer_fallback {
    ($kind:expr, $error:expr) => {
        tracing::warn!(
            kind = $kind,
            error = %$error,
            "Reviewer failed, using local redaction"
        );
    };
}

/// Log entries evicted from a full audit log
///
/// # Example
///
/// ```no_run
/// use phiguard::log_audit_eviction;
///
/// log_audit_eviction!(2_usize, 1_u64, 2_u64);
/// ```
#[macro_export]
macro_rules! log_audit_eviction {
    ($evicted:expr, $first_sequence:expr, $last_sequence:expr) => {
        tracing::warn!(
            evicted = $evicted,
            first_sequence = $first_sequence,
            last_sequence = $last_sequence,
            "Audit log at capacity, oldest entries evicted"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use phiguard::log_error_with_context;
/// use phiguard::domain::PhiGuardError;
///
/// let error = PhiGuardError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
