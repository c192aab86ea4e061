//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for PhiGuard using clap.

pub mod commands;

use crate::config::{load_config, PhiGuardConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Exit code for success
pub const EXIT_OK: i32 = 0;
/// Exit code for configuration errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for a compliance report with a high-severity flag
pub const EXIT_FLAGGED: i32 = 3;
/// Exit code for fatal errors
pub const EXIT_FATAL: i32 = 5;

/// PhiGuard - PHI redaction and compliance audit
#[derive(Parser, Debug)]
#[command(name = "phiguard")]
#[command(version, about, long_about = None)]
#[command(author = "PhiGuard Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "phiguard.toml", env = "PHIGUARD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PHIGUARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redact PHI from a file or stdin
    Redact(commands::redact::RedactArgs),

    /// Print a compliance report from a JSONL audit trail
    Report(commands::report::ReportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Load `path`, or fall back to defaults when the file does not exist
pub fn load_config_or_default(path: &str) -> Result<PhiGuardConfig> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        tracing::info!(config_path = %path, "Configuration file not found, using defaults");
        Ok(PhiGuardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_redact() {
        let cli = Cli::parse_from(["phiguard", "redact"]);
        assert_eq!(cli.config, "phiguard.toml");
        assert!(matches!(cli.command, Commands::Redact(_)));
    }

    #[test]
    fn test_cli_parse_redact_flags() {
        let cli = Cli::parse_from([
            "phiguard", "redact", "--input", "note.txt", "--no-names", "--clinical", "--json",
        ]);
        let Commands::Redact(args) = cli.command else {
            panic!("expected redact");
        };
        assert_eq!(args.input.as_deref(), Some(Path::new("note.txt")));
        assert!(args.no_names);
        assert!(args.clinical);
        assert!(args.json);
        assert!(!args.review);
    }

    #[test]
    fn test_cli_parse_report() {
        let cli = Cli::parse_from([
            "phiguard",
            "report",
            "--audit-file",
            "audit.jsonl",
            "--start",
            "2025-01-01T00:00:00Z",
        ]);
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert!(args.start.is_some());
        assert!(args.end.is_none());
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "phiguard",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "validate-config",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["phiguard", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = load_config_or_default("/nonexistent/phiguard.toml").unwrap();
        assert!(config.redaction.include_names);
    }
}
