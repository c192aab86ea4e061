//! Audit entry model

use crate::domain::ReviewerError;
use crate::phi::models::{RedactionSpan, Suggestion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Action recorded by an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A span was masked by the local redactor
    Redaction,
    /// A suggestion was surfaced, or a user decided on one
    Suggestion,
    /// An external review was attempted
    Review,
    /// A user authenticated (or failed to)
    Authentication,
    /// Data was deleted
    Deletion,
    /// The audit trail was exported
    Export,
    /// Protected data was viewed
    Access,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redaction => "redaction",
            Self::Suggestion => "suggestion",
            Self::Review => "review",
            Self::Authentication => "authentication",
            Self::Deletion => "deletion",
            Self::Export => "export",
            Self::Access => "access",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// Severity of the audited event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// User disposition of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Accepted,
    Rejected,
    Modified,
}

/// One immutable record of a redaction-related action
///
/// Field order is the export column order and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry id
    pub id: Uuid,
    /// When the action happened (UTC)
    pub timestamp: DateTime<Utc>,
    /// Action kind
    pub action: AuditAction,
    /// PHI category or suggestion kind
    pub category: Option<String>,
    /// Original text, or its `sha256:` digest
    pub original: String,
    /// Replacement written in its place
    pub replacement: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// User disposition, for suggestion decisions
    pub user_action: Option<UserAction>,
    /// Outcome
    pub outcome: AuditOutcome,
    /// Severity
    pub severity: Severity,
    /// Acting user, when known
    pub user_id: Option<String>,
    /// Free-form details (never PHI)
    pub details: Option<String>,
    /// Append sequence, assigned by the log
    #[serde(default)]
    pub sequence: u64,
}

impl AuditEntry {
    /// Create an entry for `action` stamped with the current time
    pub fn new(action: AuditAction, outcome: AuditOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            category: None,
            original: String::new(),
            replacement: String::new(),
            confidence: 1.0,
            user_action: None,
            outcome,
            severity: Severity::Info,
            user_id: None,
            details: None,
            sequence: 0,
        }
    }

    /// Entry for one masked span
    pub fn redaction(span: &RedactionSpan) -> Self {
        Self::new(AuditAction::Redaction, AuditOutcome::Success)
            .with_category(span.category.as_str())
            .with_original(&span.original)
            .with_replacement(&span.label)
            .with_confidence(span.confidence)
    }

    /// Entry for one surfaced suggestion
    pub fn suggestion(suggestion: &Suggestion) -> Self {
        Self::new(AuditAction::Suggestion, AuditOutcome::Success)
            .with_category(suggestion.kind.to_string())
            .with_original(&suggestion.text)
            .with_replacement(&suggestion.suggestion)
            .with_confidence(suggestion.confidence)
            .with_details(format!("source: {}", suggestion.source))
    }

    /// Entry for a user's decision on a suggestion
    pub fn disposition(
        suggestion: &Suggestion,
        user_action: UserAction,
        user_id: impl Into<String>,
    ) -> Self {
        let mut entry = Self::suggestion(suggestion).with_user(user_id);
        entry.user_action = Some(user_action);
        entry
    }

    /// Successful external review
    pub fn review_success(surfaced: usize, dropped: usize) -> Self {
        Self::new(AuditAction::Review, AuditOutcome::Success)
            .with_details(format!("surfaced: {surfaced}, dropped: {dropped}"))
    }

    /// Failed or skipped external review
    pub fn review_failure(error: &ReviewerError) -> Self {
        Self::new(AuditAction::Review, AuditOutcome::Failure)
            .with_severity(Severity::Low)
            .with_details(format!("{}: {error}", error.kind()))
    }

    /// Authentication attempt
    pub fn authentication(user_id: impl Into<String>, succeeded: bool) -> Self {
        let (outcome, severity) = if succeeded {
            (AuditOutcome::Success, Severity::Info)
        } else {
            (AuditOutcome::Failure, Severity::Medium)
        };
        Self::new(AuditAction::Authentication, outcome)
            .with_severity(severity)
            .with_user(user_id)
    }

    /// Deletion of a record
    pub fn deletion(user_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(AuditAction::Deletion, AuditOutcome::Success)
            .with_severity(Severity::Low)
            .with_user(user_id)
            .with_details(target)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = original.into();
        self
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Override the timestamp (imports and backfills)
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether the outcome is a failure
    pub fn is_failure(&self) -> bool {
        self.outcome == AuditOutcome::Failure
    }
}
