//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the PhiGuard configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::phi::Redactor;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // The pattern library is only compiled when the redactor is built
        let redactor = match Redactor::from_config(&config.redaction) {
            Ok(r) => {
                println!("✅ Pattern catalog compiled");
                r
            }
            Err(e) => {
                println!("❌ Pattern catalog failed to compile");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Pattern Library: {}",
            config
                .redaction
                .pattern_library
                .as_ref()
                .map_or("built-in".to_string(), |p| p.display().to_string())
        );
        println!("  Detectors: {}", redactor.catalog().len());
        println!("  Mask Names: {}", config.redaction.include_names);
        println!(
            "  Mask Clinical Mentions: {}",
            config.redaction.include_clinical_mentions
        );
        println!("  Reviewer Enabled: {}", config.reviewer.enabled);
        if config.reviewer.enabled {
            println!(
                "  Reviewer Endpoint: {}",
                config.reviewer.endpoint.as_deref().unwrap_or("-")
            );
            println!(
                "  Reviewer Key: {}",
                config
                    .reviewer
                    .api_key
                    .as_ref()
                    .map_or("(none)".to_string(), |k| k.expose_secret().masked())
            );
        }
        println!("  Audit Capacity: {}", config.audit.max_entries);
        println!("  Audit Retention: {} days", config.audit.retention_days);
        println!(
            "  Audit Journal: {}",
            config
                .audit
                .log_path
                .as_ref()
                .map_or("(memory only)".to_string(), |p| p.display().to_string())
        );
        println!();

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_config_exits_zero() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[redaction]\ninclude_names = false").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_invalid_config_exits_two() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[audit]\nmax_entries = 1").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_missing_file_exits_two() {
        let code = ValidateArgs {}
            .execute("/nonexistent/phiguard.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
