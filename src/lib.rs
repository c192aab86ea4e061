// PhiGuard - PHI Redaction and Compliance Audit Engine
// Copyright (c) 2025 PhiGuard Contributors
// Licensed under the MIT License

//! # PhiGuard - PHI Redaction and Compliance Audit
//!
//! PhiGuard masks protected health information (PHI) in free-text clinical
//! notes, optionally asks an external reviewer for a second pass, records
//! every action in a bounded audit log and scores that log for compliance.
//!
//! ## Architecture
//!
//! - [`phi`] - Detection, preservation rules, redaction and local suggestions
//! - [`core`] - Audit log, compliance reports, reviewer gateway and the pipeline
//! - [`adapters`] - External reviewer client
//! - [`domain`] - Error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust
//! use phiguard::phi::{RedactOptions, Redactor};
//!
//! let redactor = Redactor::builtin()?;
//! let result = redactor.redact(
//!     "Call John Smith at 555-123-4567, MRN: 00012345",
//!     &RedactOptions::default(),
//! );
//!
//! assert_eq!(result.redacted_text(), "Call [NAME] at [PHONE], MRN: [MRN]");
//! assert_eq!(result.total_spans(), 3);
//! # Ok::<(), phiguard::domain::PhiGuardError>(())
//! ```
//!
//! ## Audit and Compliance
//!
//! ```rust
//! use phiguard::config::ComplianceConfig;
//! use phiguard::core::audit::{AuditEntry, AuditLog};
//! use phiguard::core::compliance::ComplianceReporter;
//! use chrono::{Duration, Utc};
//!
//! let log = AuditLog::in_memory(1000);
//! log.append(AuditEntry::authentication("clinician-1", true))?;
//!
//! let now = Utc::now();
//! let report = ComplianceReporter::new(ComplianceConfig::default())
//!     .report(&log, now - Duration::days(1), now + Duration::seconds(1));
//! assert_eq!(report.total_events, 1);
//! # Ok::<(), phiguard::domain::AuditError>(())
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod phi;
