//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "phiguard.toml")]
    pub output: String,

    /// Include every option with explanatory comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing PhiGuard configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. To use the external reviewer, set PHIGUARD_REVIEWER_KEY in .env");
                println!("  3. Validate configuration: phiguard validate-config");
                println!("  4. Redact a note: phiguard redact --input note.txt");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> &'static str {
        r#"# PhiGuard Configuration File

[application]
log_level = "info"

[redaction]
include_names = true
include_clinical_mentions = false

[reviewer]
enabled = false
# endpoint = "https://reviewer.example.com/v1/review"
# api_key = "${PHIGUARD_REVIEWER_KEY}"

[audit]
max_entries = 10000
retention_days = 2190
log_path = "./audit/phiguard-audit.jsonl"

[logging]
local_enabled = false
"#
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> &'static str {
        r#"# PhiGuard Configuration File
# PHI redaction and compliance audit engine
#
# Any value may reference an environment variable as "${NAME}".
# Any key may be overridden with PHIGUARD_<SECTION>_<KEY>, for example
# PHIGUARD_AUDIT_MAX_ENTRIES=50000.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
log_level = "info"

# ============================================================================
# Redaction
# ============================================================================
[redaction]
# Mask person names
include_names = true

# Also mask diagnosis and medication mentions
include_clinical_mentions = false

# Optional custom pattern library (same format as the built-in one)
# pattern_library = "./patterns/site_patterns.toml"

# Clinical vocabulary that must never be masked, in addition to the defaults
extra_clinical_terms = []

# Staff titles that must never be masked, in addition to the defaults
extra_staff_titles = []

# ============================================================================
# External Reviewer (optional)
# ============================================================================
[reviewer]
# Send local redactions for a second review
enabled = false

# HTTPS endpoint receiving {original_text, current_redacted_text}
# endpoint = "https://reviewer.example.com/v1/review"

# Bearer credential (use environment variable)
# api_key = "${PHIGUARD_REVIEWER_KEY}"

# Overall time budget per review in seconds (1-120)
timeout_seconds = 10

# Retries after a transport failure (0-10)
max_retries = 1

# Linear backoff step between retries in milliseconds
retry_backoff_ms = 250

# ============================================================================
# Audit Log
# ============================================================================
[audit]
# In-memory capacity; the oldest entries are evicted when full
max_entries = 10000

# Entries older than this are pruned from memory
retention_days = 2190

# How often the retention task runs, in seconds
prune_interval_seconds = 3600

# Append-only JSONL journal (omit for memory only)
log_path = "./audit/phiguard-audit.jsonl"

# Store sha256 digests instead of original text
hash_originals = true

# ============================================================================
# Compliance Report
# ============================================================================
[compliance]
# Failed logins tolerated before a high-severity flag
failed_auth_threshold = 5

# Deletions tolerated before a medium-severity flag
deletion_threshold = 10

# ============================================================================
# Logging
# ============================================================================
[logging]
# Enable JSON file logging
local_enabled = false

# Log directory
local_path = "./logs"

# Rotation (daily or hourly)
local_rotation = "daily"
"#
    }
}
