//! PHI detection and redaction
//!
//! This module is the synchronous, local half of PhiGuard. Everything in it is
//! pure and reentrant: the catalog, preservation rules and redactor only read
//! immutable data and write to a per-call result.
//!
//! # Architecture
//!
//! - **Detector**: Pattern catalog of regex detectors, ordered by priority
//! - **Preservation**: Allow-list of clinical terms and staff titles
//! - **Redactor**: Overlap resolution and label substitution
//! - **Heuristics**: Local suggestions that never touch the redacted text

pub mod detector;
pub mod heuristics;
pub mod models;
pub mod preservation;
pub mod redactor;

pub use detector::{PatternCatalog, PhiDetector};
pub use heuristics::{screen_suggestions, SuggestionEngine};
pub use models::{
    PhiCategory, RedactionResult, RedactionSpan, Suggestion, SuggestionKind, SuggestionSource,
};
pub use preservation::{PreservationRules, Preserved};
pub use redactor::{RedactOptions, Redactor};
