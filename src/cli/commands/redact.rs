//! Redact command implementation
//!
//! Reads clinical text from a file or stdin and prints the redacted text.
//! The audit trail is written to `audit.log_path` when configured, and the
//! retention task prunes it for as long as the command runs.

use crate::cli::{load_config_or_default, EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use crate::core::pipeline::PhiPipeline;
use crate::core::review::Enhancement;
use crate::domain::PhiGuardError;
use crate::phi::models::{RedactionResult, Suggestion};
use crate::phi::RedactOptions;
use anyhow::Context;
use clap::Args;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the redact command
#[derive(Args, Debug)]
pub struct RedactArgs {
    /// Input file (reads stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Do not mask person names
    #[arg(long)]
    pub no_names: bool,

    /// Also mask diagnosis and medication mentions
    #[arg(long)]
    pub clinical: bool,

    /// Send the local redaction to the configured reviewer
    #[arg(long)]
    pub review: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl RedactArgs {
    /// Execute the redact command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        config.reviewer.enabled = self.review;

        let pipeline = match PhiPipeline::new(&config) {
            Ok(p) => p,
            Err(e @ (PhiGuardError::Configuration(_) | PhiGuardError::Catalog(_))) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to initialize pipeline");
                eprintln!("❌ {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let retention = pipeline.spawn_retention(shutdown_signal.clone());

        let bytes = self.read_input()?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let options = self.options(pipeline.default_options());

        let local = pipeline.redact_and_record(&text, &options)?;
        let suggestions = pipeline.local_suggestions(&text, &local)?;

        let enhancement = match pipeline.spawn_enhancement(text, local.clone(), shutdown_signal) {
            Some(handle) => Some(handle.await.context("Review task failed")??),
            None => None,
        };

        retention.abort();

        if self.json {
            println!("{}", render_json(&local, &suggestions, enhancement.as_ref())?);
        } else {
            render_console(&local, &suggestions, enhancement.as_ref());
        }

        Ok(EXIT_OK)
    }

    fn options(&self, defaults: RedactOptions) -> RedactOptions {
        RedactOptions {
            include_names: defaults.include_names && !self.no_names,
            include_clinical_mentions: defaults.include_clinical_mentions || self.clinical,
        }
    }

    fn read_input(&self) -> anyhow::Result<Vec<u8>> {
        match &self.input {
            Some(path) => std::fs::read(path)
                .with_context(|| format!("Failed to read input file {}", path.display())),
            None => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .context("Failed to read stdin")?;
                Ok(buf)
            }
        }
    }
}

fn final_text<'a>(local: &'a RedactionResult, enhancement: Option<&'a Enhancement>) -> &'a str {
    match enhancement {
        Some(e) if e.is_enhanced() => &e.enhanced_text,
        _ => local.redacted_text(),
    }
}

fn render_json(
    local: &RedactionResult,
    suggestions: &[Suggestion],
    enhancement: Option<&Enhancement>,
) -> anyhow::Result<String> {
    let review = enhancement.map(|e| {
        json!({
            "status": e.status.as_str(),
            "error": e.status.error().map(|err| err.to_string()),
            "suggestions": e.suggestions,
        })
    });

    let body = json!({
        "redacted_text": final_text(local, enhancement),
        "local": local,
        "suggestions": suggestions,
        "review": review,
    });

    serde_json::to_string_pretty(&body).context("Failed to serialize result")
}

fn render_console(
    local: &RedactionResult,
    suggestions: &[Suggestion],
    enhancement: Option<&Enhancement>,
) {
    println!("{}", final_text(local, enhancement));

    eprintln!();
    eprintln!(
        "🔒 {} span(s) redacted, confidence {:.2}",
        local.total_spans(),
        local.confidence()
    );
    for (category, count) in local.counts() {
        eprintln!("   {:<22} {}", category.as_str(), count);
    }
    for warning in local.warnings() {
        eprintln!("⚠️  {warning}");
    }

    let reviewer_suggestions = enhancement.map(|e| e.suggestions.as_slice()).unwrap_or_default();
    for s in suggestions.iter().chain(reviewer_suggestions) {
        eprintln!(
            "💡 [{}] '{}' → '{}' ({}, {})",
            s.kind, s.text, s.suggestion, s.reason, s.source
        );
    }

    if let Some(e) = enhancement {
        match e.status.error() {
            Some(err) => eprintln!("ℹ️  Review {}: {err}", e.status.as_str()),
            None => eprintln!("ℹ️  Review {}", e.status.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::Redactor;

    fn args() -> RedactArgs {
        RedactArgs {
            input: None,
            no_names: false,
            clinical: false,
            review: false,
            json: false,
        }
    }

    #[test]
    fn test_options_merge_flags_with_config() {
        let defaults = RedactOptions::default();
        assert_eq!(args().options(defaults), defaults);

        let flagged = RedactArgs {
            no_names: true,
            clinical: true,
            ..args()
        };
        let options = flagged.options(defaults);
        assert!(!options.include_names);
        assert!(options.include_clinical_mentions);
    }

    #[test]
    fn test_render_json_shape() {
        let local = Redactor::builtin()
            .unwrap()
            .redact("Call 555-123-4567", &RedactOptions::default());
        let out = render_json(&local, &[], None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["redacted_text"], "Call [PHONE]");
        assert!(value["review"].is_null());
        assert_eq!(value["suggestions"], json!([]));
    }
}
