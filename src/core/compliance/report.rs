//! Compliance report structures
//!
//! A report is derived from the audit log on demand and never stored as the
//! source of truth.

use crate::config::ComplianceConfig;
use crate::core::audit::{AuditAction, AuditEntry, AuditOutcome, EvictionGap, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const SECONDS_PER_DAY: i64 = 86_400;
const FAILED_EVENT_PENALTY: i64 = 2;
const HIGH_FLAG_PENALTY: i64 = 10;
const MEDIUM_FLAG_PENALTY: i64 = 5;

/// Severity of a compliance flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
}

impl FlagSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A detected anomaly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceFlag {
    pub severity: FlagSeverity,
    /// Stable machine-readable code, e.g. `failed_authentication`
    pub code: String,
    pub message: String,
}

impl ComplianceFlag {
    fn new(severity: FlagSeverity, code: &str, message: String) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message,
        }
    }
}

/// Scored summary of audit activity over `[period_start, period_end)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_events: usize,
    pub by_action: BTreeMap<AuditAction, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// Entries with severity `high` or `critical`
    pub critical_events: usize,
    /// Entries with outcome `failure`, any action
    pub failed_events: usize,
    pub distinct_users: usize,
    /// 0 to 100, higher is better
    pub score: u8,
    pub flags: Vec<ComplianceFlag>,
    /// Eviction gaps overlapping the period
    pub gaps: Vec<EvictionGap>,
}

impl ComplianceReport {
    /// Build a report from raw entries and gaps
    ///
    /// Entries outside the period are ignored, so callers may pass an
    /// unfiltered slice.
    pub fn from_entries(
        entries: &[AuditEntry],
        gaps: &[EvictionGap],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        config: &ComplianceConfig,
    ) -> Self {
        let in_period: Vec<&AuditEntry> = entries
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp < end)
            .collect();

        let mut by_action = BTreeMap::new();
        let mut by_category = BTreeMap::new();
        let mut users = BTreeSet::new();
        let mut critical_events = 0;
        let mut failed_events = 0;
        let mut failed_auth = 0u64;
        let mut deletions = 0u64;

        for entry in &in_period {
            *by_action.entry(entry.action).or_insert(0) += 1;
            if let Some(category) = &entry.category {
                *by_category.entry(category.clone()).or_insert(0) += 1;
            }
            if let Some(user) = &entry.user_id {
                users.insert(user.as_str());
            }
            if entry.severity >= Severity::High {
                critical_events += 1;
            }
            if entry.outcome == AuditOutcome::Failure {
                failed_events += 1;
                if entry.action == AuditAction::Authentication {
                    failed_auth += 1;
                }
            }
            if entry.action == AuditAction::Deletion {
                deletions += 1;
            }
        }

        let gaps: Vec<EvictionGap> = gaps
            .iter()
            .filter(|g| g.intersects(start, end))
            .cloned()
            .collect();

        let total_events = in_period.len();
        let days = period_days(start, end);
        let mut flags = Vec::new();

        if failed_auth > u64::from(config.failed_auth_threshold) {
            flags.push(ComplianceFlag::new(
                FlagSeverity::High,
                "failed_authentication",
                format!(
                    "{failed_auth} failed authentication attempts (threshold {})",
                    config.failed_auth_threshold
                ),
            ));
        }

        if deletions > u64::from(config.deletion_threshold) {
            flags.push(ComplianceFlag::new(
                FlagSeverity::Medium,
                "excessive_deletions",
                format!(
                    "{deletions} deletion events (threshold {})",
                    config.deletion_threshold
                ),
            ));
        }

        if total_events == 0 {
            flags.push(ComplianceFlag::new(
                FlagSeverity::Low,
                "empty_trail",
                "No audit events recorded in the period".to_string(),
            ));
        } else if (total_events as i64) < days {
            flags.push(ComplianceFlag::new(
                FlagSeverity::Low,
                "sparse_trail",
                format!("{total_events} events over {days} days"),
            ));
        }

        if !gaps.is_empty() {
            let evicted: usize = gaps.iter().map(|g| g.evicted).sum();
            flags.push(ComplianceFlag::new(
                FlagSeverity::Medium,
                "audit_gap",
                format!("{evicted} entries evicted from the period before reporting"),
            ));
        }

        let score = compute_score(failed_events, &flags);

        Self {
            period_start: start,
            period_end: end,
            total_events,
            by_action,
            by_category,
            critical_events,
            failed_events,
            distinct_users: users.len(),
            score,
            flags,
            gaps,
        }
    }

    /// Whether any flag is high severity
    pub fn has_high_severity(&self) -> bool {
        self.flags.iter().any(|f| f.severity == FlagSeverity::High)
    }

    pub fn flags_of(&self, severity: FlagSeverity) -> impl Iterator<Item = &ComplianceFlag> {
        self.flags.iter().filter(move |f| f.severity == severity)
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push_str("\n");
        output.push_str("═══════════════════════════════════════════════════════════\n");
        output.push_str("              COMPLIANCE REPORT\n");
        output.push_str("═══════════════════════════════════════════════════════════\n\n");

        output.push_str(&format!(
            "Period: {} → {}\n",
            self.period_start.format("%Y-%m-%d %H:%M:%S UTC"),
            self.period_end.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!("Score: {}/100\n\n", self.score));

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Total events:        {}\n", self.total_events));
        output.push_str(&format!("Critical events:     {}\n", self.critical_events));
        output.push_str(&format!("Failed events:       {}\n", self.failed_events));
        output.push_str(&format!("Distinct users:      {}\n\n", self.distinct_users));

        if !self.by_action.is_empty() {
            output.push_str("📋 BY ACTION\n");
            output.push_str("───────────────────────────────────────────────────────────\n");
            for (action, count) in &self.by_action {
                output.push_str(&format!("  {:<18} {}\n", action.as_str(), count));
            }
            output.push('\n');
        }

        if !self.by_category.is_empty() {
            output.push_str("🏷️  BY CATEGORY\n");
            output.push_str("───────────────────────────────────────────────────────────\n");
            for (category, count) in &self.by_category {
                output.push_str(&format!("  {:<18} {}\n", category, count));
            }
            output.push('\n');
        }

        if self.flags.is_empty() {
            output.push_str("✅ No anomalies detected\n");
        } else {
            output.push_str(&format!("⚠️  FLAGS ({})\n", self.flags.len()));
            output.push_str("───────────────────────────────────────────────────────────\n");
            for flag in &self.flags {
                output.push_str(&format!(
                    "  [{}] {}: {}\n",
                    flag.severity.as_str().to_uppercase(),
                    flag.code,
                    flag.message
                ));
            }
        }

        if !self.gaps.is_empty() {
            output.push('\n');
            output.push_str("🕳️  EVICTION GAPS\n");
            output.push_str("───────────────────────────────────────────────────────────\n");
            for gap in &self.gaps {
                output.push_str(&format!(
                    "  {} entries (seq {}..={}) from {} to {}\n",
                    gap.evicted,
                    gap.first_sequence,
                    gap.last_sequence,
                    gap.oldest_evicted.format("%Y-%m-%d %H:%M:%S"),
                    gap.newest_evicted.format("%Y-%m-%d %H:%M:%S")
                ));
            }
        }

        output.push_str("\n═══════════════════════════════════════════════════════════\n");

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Calendar days covered by the period, rounded up, at least 1
fn period_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let secs = (end - start).num_seconds().max(0);
    ((secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1)
}

fn compute_score(failed_events: usize, flags: &[ComplianceFlag]) -> u8 {
    let high = flags.iter().filter(|f| f.severity == FlagSeverity::High).count() as i64;
    let medium = flags.iter().filter(|f| f.severity == FlagSeverity::Medium).count() as i64;

    let score = 100
        - FAILED_EVENT_PENALTY.saturating_mul(failed_events as i64)
        - HIGH_FLAG_PENALTY * high
        - MEDIUM_FLAG_PENALTY * medium;

    score.clamp(0, 100) as u8
}
