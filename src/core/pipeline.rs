//! Redaction pipeline
//!
//! Wires the redactor, local suggestion engine, audit log and optional
//! reviewer gateway together. Local redaction always completes without
//! touching the network; enhancement is layered on afterwards.

use crate::config::PhiGuardConfig;
use crate::core::audit::{spawn_retention_task, AuditEntry, AuditLog, UserAction};
use crate::core::compliance::ComplianceReporter;
use crate::core::review::{Enhancement, ReviewerGateway};
use crate::domain::Result;
use crate::phi::heuristics::SuggestionEngine;
use crate::phi::models::{RedactionResult, Suggestion};
use crate::phi::redactor::{RedactOptions, Redactor};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Everything produced for one piece of text
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub local: RedactionResult,
    /// Local heuristic suggestions
    pub suggestions: Vec<Suggestion>,
    /// `None` when no reviewer is configured
    pub enhancement: Option<Enhancement>,
}

impl PipelineOutcome {
    /// Best available text: the reviewer's if it was accepted, the local one otherwise
    pub fn final_text(&self) -> &str {
        match &self.enhancement {
            Some(e) if e.is_enhanced() => &e.enhanced_text,
            _ => self.local.redacted_text(),
        }
    }
}

/// Redaction, audit and review in one handle
pub struct PhiPipeline {
    redactor: Arc<Redactor>,
    engine: Arc<SuggestionEngine>,
    audit: Arc<AuditLog>,
    gateway: Option<Arc<ReviewerGateway>>,
    reporter: ComplianceReporter,
    defaults: RedactOptions,
    retention_days: u32,
    prune_interval: Duration,
}

impl PhiPipeline {
    /// Build every component described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the pattern library
    /// is malformed or the audit journal cannot be opened.
    pub fn new(config: &PhiGuardConfig) -> Result<Self> {
        let audit = Arc::new(AuditLog::new(&config.audit)?);
        Self::with_audit(config, audit)
    }

    /// Build around an existing audit log
    pub fn with_audit(config: &PhiGuardConfig, audit: Arc<AuditLog>) -> Result<Self> {
        config
            .validate()
            .map_err(crate::domain::PhiGuardError::Configuration)?;

        let redactor = Arc::new(Redactor::from_config(&config.redaction)?);
        let engine = Arc::new(SuggestionEngine::new(redactor.rules().clone())?);

        let gateway = if config.reviewer.enabled {
            Some(Arc::new(ReviewerGateway::from_config(
                &config.reviewer,
                Arc::clone(&audit),
                redactor.rules().clone(),
            )?))
        } else {
            None
        };

        tracing::info!(
            detectors = redactor.catalog().len(),
            reviewer = gateway.as_ref().is_some_and(|g| g.is_available()),
            audit_capacity = audit.max_entries(),
            "PHI pipeline initialized"
        );

        Ok(Self {
            redactor,
            engine,
            audit,
            gateway,
            reporter: ComplianceReporter::new(config.compliance.clone()),
            defaults: RedactOptions::from_config(&config.redaction),
            retention_days: config.audit.retention_days,
            prune_interval: Duration::from_secs(config.audit.prune_interval_seconds),
        })
    }

    /// Replace the reviewer gateway
    pub fn with_gateway(mut self, gateway: ReviewerGateway) -> Self {
        self.gateway = Some(Arc::new(gateway));
        self
    }

    pub fn redactor(&self) -> &Arc<Redactor> {
        &self.redactor
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    pub fn reporter(&self) -> &ComplianceReporter {
        &self.reporter
    }

    pub fn gateway(&self) -> Option<&Arc<ReviewerGateway>> {
        self.gateway.as_ref()
    }

    /// Retention window from `audit.retention_days`
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Prune the audit log every `audit.prune_interval_seconds`, keeping
    /// `audit.retention_days`, until `shutdown` turns true
    pub fn spawn_retention(&self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        spawn_retention_task(
            Arc::clone(&self.audit),
            self.retention_days,
            self.prune_interval,
            shutdown,
        )
    }

    /// Options taken from the `[redaction]` section
    pub fn default_options(&self) -> RedactOptions {
        self.defaults
    }

    /// Redact `text` and record one `redaction` entry per span
    ///
    /// # Errors
    ///
    /// Returns an error only if the audit log rejects the batch.
    pub fn redact_and_record(&self, text: &str, options: &RedactOptions) -> Result<RedactionResult> {
        let started = Instant::now();
        let result = self.redactor.redact(text, options);

        let entries: Vec<AuditEntry> = result.spans().iter().map(AuditEntry::redaction).collect();
        self.audit.append_batch(entries)?;

        crate::log_redaction_complete!(result.total_spans(), result.confidence(), started.elapsed());
        Ok(result)
    }

    /// Local heuristic suggestions, each recorded as a `suggestion` entry
    pub fn local_suggestions(&self, text: &str, result: &RedactionResult) -> Result<Vec<Suggestion>> {
        let suggestions = self.engine.suggest(text, result);
        let entries: Vec<AuditEntry> = suggestions.iter().map(AuditEntry::suggestion).collect();
        self.audit.append_batch(entries)?;
        Ok(suggestions)
    }

    /// Redact, suggest and, if configured, enhance
    pub async fn process(&self, text: &str, options: &RedactOptions) -> Result<PipelineOutcome> {
        let local = self.redact_and_record(text, options)?;
        let suggestions = self.local_suggestions(text, &local)?;

        let enhancement = match &self.gateway {
            Some(gateway) => Some(gateway.enhance(text, &local).await?),
            None => None,
        };

        Ok(PipelineOutcome {
            local,
            suggestions,
            enhancement,
        })
    }

    /// Start enhancement in the background and return immediately
    ///
    /// Returns `None` when no reviewer is configured.
    pub fn spawn_enhancement(
        &self,
        original: String,
        local: RedactionResult,
        cancel: watch::Receiver<bool>,
    ) -> Option<JoinHandle<Result<Enhancement>>> {
        let gateway = Arc::clone(self.gateway.as_ref()?);
        Some(tokio::spawn(async move {
            gateway.enhance_with_cancel(&original, &local, cancel).await
        }))
    }

    /// Record a user's decision on a suggestion
    pub fn record_disposition(
        &self,
        suggestion: &Suggestion,
        action: UserAction,
        user_id: &str,
    ) -> Result<u64> {
        let sequence = self
            .audit
            .append(AuditEntry::disposition(suggestion, action, user_id))?;
        Ok(sequence)
    }
}

impl std::fmt::Debug for PhiPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhiPipeline")
            .field("detectors", &self.redactor.catalog().len())
            .field("gateway", &self.gateway)
            .field("audit_entries", &self.audit.len())
            .finish()
    }
}
