//! Configuration schema types
//!
//! This module defines the configuration structure for PhiGuard. Every section
//! has defaults, so an empty file (or no file at all) is a valid configuration.

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main PhiGuard configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhiGuardConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Redaction settings
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// External reviewer settings
    #[serde(default)]
    pub reviewer: ReviewerConfig,

    /// Audit log settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Compliance report thresholds
    #[serde(default)]
    pub compliance: ComplianceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PhiGuardConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.redaction.validate()?;
        self.reviewer.validate()?;
        self.audit.validate()?;
        self.compliance.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Redaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Mask person names
    #[serde(default = "default_true")]
    pub include_names: bool,

    /// Mask diagnosis and medication mentions
    #[serde(default)]
    pub include_clinical_mentions: bool,

    /// Custom pattern library (TOML); the built-in library is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_library: Option<PathBuf>,

    /// Clinical terms preserved in addition to the built-in vocabulary
    #[serde(default)]
    pub extra_clinical_terms: Vec<String>,

    /// Staff titles preserved in addition to the built-in list
    #[serde(default)]
    pub extra_staff_titles: Vec<String>,
}

impl RedactionConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.pattern_library {
            if path.as_os_str().is_empty() {
                return Err("redaction.pattern_library must not be empty".to_string());
            }
        }

        if self.extra_clinical_terms.iter().any(|t| t.trim().is_empty()) {
            return Err("redaction.extra_clinical_terms must not contain blank entries".to_string());
        }
        if self.extra_staff_titles.iter().any(|t| t.trim().is_empty()) {
            return Err("redaction.extra_staff_titles must not contain blank entries".to_string());
        }

        Ok(())
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            include_names: true,
            include_clinical_mentions: false,
            pattern_library: None,
            extra_clinical_terms: Vec::new(),
            extra_staff_titles: Vec::new(),
        }
    }
}

/// External reviewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerConfig {
    /// Enable the reviewer gateway
    #[serde(default)]
    pub enabled: bool,

    /// Reviewer endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Bearer credential
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Overall time budget for one review, in seconds
    #[serde(default = "default_reviewer_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retries after a failed transport attempt
    #[serde(default = "default_reviewer_max_retries")]
    pub max_retries: u32,

    /// Linear backoff step between retries, in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl ReviewerConfig {
    /// Whether a usable credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_blank())
    }

    fn validate(&self) -> Result<(), String> {
        if !(1..=120).contains(&self.timeout_seconds) {
            return Err(format!(
                "reviewer.timeout_seconds must be between 1 and 120, got {}",
                self.timeout_seconds
            ));
        }

        if self.max_retries > 10 {
            return Err(format!(
                "reviewer.max_retries must be <= 10, got {}",
                self.max_retries
            ));
        }

        if self.enabled {
            let endpoint = self
                .endpoint
                .as_deref()
                .ok_or("reviewer.endpoint is required when the reviewer is enabled")?;
            let url = url::Url::parse(endpoint)
                .map_err(|e| format!("Invalid reviewer.endpoint '{endpoint}': {e}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(format!(
                    "reviewer.endpoint must use http or https, got '{}'",
                    url.scheme()
                ));
            }
        }

        Ok(())
    }
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            api_key: None,
            timeout_seconds: default_reviewer_timeout_seconds(),
            max_retries: default_reviewer_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Maximum number of entries kept in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Retention window in days (2190 = six years)
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Interval between background prune runs, in seconds
    #[serde(default = "default_prune_interval_seconds")]
    pub prune_interval_seconds: u64,

    /// Append-only JSONL sink; entries are kept in memory only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Store SHA-256 digests instead of original text
    #[serde(default = "default_true")]
    pub hash_originals: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_entries < 2 {
            return Err(format!(
                "audit.max_entries must be >= 2, got {}",
                self.max_entries
            ));
        }
        if self.retention_days == 0 {
            return Err("audit.retention_days must be > 0".to_string());
        }
        if self.prune_interval_seconds == 0 {
            return Err("audit.prune_interval_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            retention_days: default_retention_days(),
            prune_interval_seconds: default_prune_interval_seconds(),
            log_path: None,
            hash_originals: true,
        }
    }
}

/// Compliance report thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Failed authentication events tolerated before a high-severity flag
    #[serde(default = "default_failed_auth_threshold")]
    pub failed_auth_threshold: u32,

    /// Deletion events tolerated before a medium-severity flag
    #[serde(default = "default_deletion_threshold")]
    pub deletion_threshold: u32,
}

impl ComplianceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.failed_auth_threshold == 0 {
            return Err("compliance.failed_auth_threshold must be > 0".to_string());
        }
        if self.deletion_threshold == 0 {
            return Err("compliance.deletion_threshold must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            failed_auth_threshold: default_failed_auth_threshold(),
            deletion_threshold: default_deletion_threshold(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_reviewer_timeout_seconds() -> u64 {
    10
}

fn default_reviewer_max_retries() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_max_entries() -> usize {
    10_000
}

fn default_retention_days() -> u32 {
    2190
}

fn default_prune_interval_seconds() -> u64 {
    3600
}

fn default_failed_auth_threshold() -> u32 {
    5
}

fn default_deletion_threshold() -> u32 {
    10
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
