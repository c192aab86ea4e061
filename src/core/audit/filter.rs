//! Audit query filter

use super::entry::{AuditAction, AuditEntry, AuditOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter for [`AuditLog::query`](super::AuditLog::query) and exports
///
/// Empty sets match everything. `start` is inclusive and `end` exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actions: Vec<AuditAction>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub outcomes: Vec<AuditOutcome>,
    pub user_id: Option<String>,
    /// Maximum number of entries returned (most recent first)
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// Match everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Entries in `[start, end)`
    pub fn period(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn with_outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an entry passes every criterion
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if self.start.is_some_and(|start| entry.timestamp < start) {
            return false;
        }
        if self.end.is_some_and(|end| entry.timestamp >= end) {
            return false;
        }
        if !self.actions.is_empty() && !self.actions.contains(&entry.action) {
            return false;
        }
        if !self.categories.is_empty() {
            let Some(category) = &entry.category else {
                return false;
            };
            if !self.categories.iter().any(|c| c == category) {
                return false;
            }
        }
        if !self.outcomes.is_empty() && !self.outcomes.contains(&entry.outcome) {
            return false;
        }
        if let Some(user_id) = &self.user_id {
            if entry.user_id.as_ref() != Some(user_id) {
                return false;
            }
        }
        true
    }
}
