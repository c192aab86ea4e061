//! Configuration management for PhiGuard.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! PhiGuard uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PHIGUARD_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`RedactionConfig`] - Name/clinical-mention switches, pattern library, preservation extras
//! - [`ReviewerConfig`] - External reviewer endpoint, credential, timeout and retries
//! - [`AuditConfig`] - Capacity, retention and the JSONL sink
//! - [`ComplianceConfig`] - Report flag thresholds
//! - [`LoggingConfig`] - Rolling file logs
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [redaction]
//! include_names = true
//! extra_clinical_terms = ["Glasgow Coma Scale"]
//!
//! [reviewer]
//! enabled = true
//! endpoint = "https://reviewer.example.com/v1/review"
//! api_key = "${PHIGUARD_REVIEWER_KEY}"
//! timeout_seconds = 10
//!
//! [audit]
//! max_entries = 10000
//! retention_days = 2190
//! log_path = "./audit/phiguard-audit.jsonl"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, AuditConfig, ComplianceConfig, LoggingConfig, PhiGuardConfig,
    RedactionConfig, ReviewerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
