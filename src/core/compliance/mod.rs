//! Compliance reporting over the audit log

pub mod report;

pub use report::{ComplianceFlag, ComplianceReport, FlagSeverity};

use crate::config::ComplianceConfig;
use crate::core::audit::{AuditFilter, AuditLog};
use chrono::{DateTime, Utc};

/// Aggregates audit activity into scored reports
#[derive(Debug, Clone, Default)]
pub struct ComplianceReporter {
    config: ComplianceConfig,
}

impl ComplianceReporter {
    pub fn new(config: ComplianceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    /// Report on `[start, end)`
    pub fn report(&self, log: &AuditLog, start: DateTime<Utc>, end: DateTime<Utc>) -> ComplianceReport {
        let entries = log.query(&AuditFilter::period(start, end));
        let gaps = log.gaps();
        let report = ComplianceReport::from_entries(&entries, &gaps, start, end, &self.config);

        tracing::info!(
            total_events = report.total_events,
            score = report.score,
            flags = report.flags.len(),
            "Compliance report generated"
        );

        report
    }
}
