//! Report command implementation
//!
//! Loads a JSONL audit trail and prints a compliance report for a period.

use crate::cli::{load_config_or_default, EXIT_CONFIG, EXIT_FATAL, EXIT_FLAGGED, EXIT_OK};
use crate::config::AuditConfig;
use crate::core::audit::{read_jsonl_file, AuditLog};
use crate::domain::AuditError;
use crate::core::compliance::ComplianceReporter;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use std::path::{Path, PathBuf};

/// Default reporting window when `--start` is omitted
pub const DEFAULT_PERIOD_DAYS: i64 = 30;

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// JSONL audit file (defaults to `audit.log_path`)
    #[arg(long)]
    pub audit_file: Option<PathBuf>,

    /// Period start, RFC 3339 (default: 30 days before end)
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,

    /// Period end, RFC 3339, exclusive (default: now)
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    /// Execute the report command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let Some(path) = self.audit_file.clone().or(config.audit.log_path.clone()) else {
            eprintln!("❌ No audit file given and audit.log_path is not configured");
            return Ok(EXIT_CONFIG);
        };

        let (start, end) = self.period(Utc::now());
        if start >= end {
            eprintln!("❌ Report start {start} must be before end {end}");
            return Ok(EXIT_CONFIG);
        }

        tracing::info!(audit_file = %path.display(), %start, %end, "Generating compliance report");

        let log = match load_trail(&path, &config.audit) {
            Ok(log) => log,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to load audit trail");
                eprintln!("❌ {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let report = ComplianceReporter::new(config.compliance.clone()).report(&log, start, end);

        if self.json {
            println!("{}", report.format_json().context("Failed to serialize report")?);
        } else {
            print!("{}", report.format_console());
        }

        Ok(if report.has_high_severity() {
            EXIT_FLAGGED
        } else {
            EXIT_OK
        })
    }

    fn period(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = self.end.unwrap_or(now);
        let start = self
            .start
            .unwrap_or_else(|| end - Duration::days(DEFAULT_PERIOD_DAYS));
        (start, end)
    }
}

/// Load a JSONL trail, dropping entries past `audit.retention_days`
fn load_trail(path: &Path, audit: &AuditConfig) -> Result<AuditLog, AuditError> {
    let log = AuditLog::from_entries(read_jsonl_file(path)?, audit.max_entries);
    let expired = log.prune(audit.retention_days);
    if expired > 0 {
        tracing::info!(expired, retention_days = audit.retention_days, "Skipping expired audit entries");
    }
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::{to_jsonl, AuditEntry, AuditFilter};
    use chrono::TimeZone;

    #[test]
    fn test_default_period_is_thirty_days() {
        let args = ReportArgs {
            audit_file: None,
            start: None,
            end: None,
            json: false,
        };
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        let (start, end) = args.period(now);

        assert_eq!(end, now);
        assert_eq!(end - start, Duration::days(30));
    }

    #[test]
    fn test_explicit_period() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let args = ReportArgs {
            audit_file: None,
            start: Some(start),
            end: Some(end),
            json: true,
        };
        assert_eq!(args.period(Utc::now()), (start, end));
    }

    #[test]
    fn test_load_trail_drops_expired_entries() {
        let entries = vec![
            AuditEntry::deletion("admin", "expired").at(Utc::now() - Duration::days(120)),
            AuditEntry::deletion("admin", "kept").at(Utc::now() - Duration::days(10)),
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        std::fs::write(&path, to_jsonl(&entries).unwrap()).unwrap();

        let audit = AuditConfig {
            retention_days: 90,
            ..AuditConfig::default()
        };
        let log = load_trail(&path, &audit).unwrap();

        let remaining = log.query(&AuditFilter::all());
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].details.as_deref(), Some("kept"));
    }
}
