//! Reviewer gateway
//!
//! Wraps a [`ReviewerClient`] with a time budget, cancellation, response
//! re-validation and audit recording. Every failure degrades to the local
//! redaction; the gateway never fails the caller for a reviewer problem.

use crate::adapters::reviewer::{HttpReviewerClient, ReviewResponse, ReviewerClient};
use crate::config::ReviewerConfig;
use crate::core::audit::{AuditEntry, AuditLog};
use crate::domain::{ReviewerError, Result};
use crate::phi::heuristics::screen_suggestions;
use crate::phi::models::{RedactionResult, Suggestion};
use crate::phi::preservation::PreservationRules;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How an enhancement request ended
#[derive(Debug, Clone, PartialEq)]
pub enum EnhancementStatus {
    /// The reviewer answered and its output passed validation
    Enhanced {
        /// Suggestions dropped by validation or for an unknown type
        dropped: usize,
    },
    /// No reviewer is available; local output returned
    Skipped(ReviewerError),
    /// The reviewer failed; local output returned
    Fallback(ReviewerError),
    /// The caller cancelled; local output returned and nothing recorded
    Cancelled,
}

impl EnhancementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enhanced { .. } => "enhanced",
            Self::Skipped(_) => "skipped",
            Self::Fallback(_) => "fallback",
            Self::Cancelled => "cancelled",
        }
    }

    /// The reviewer error behind a skip or fallback
    pub fn error(&self) -> Option<&ReviewerError> {
        match self {
            Self::Skipped(e) | Self::Fallback(e) => Some(e),
            _ => None,
        }
    }
}

/// Result of [`ReviewerGateway::enhance`]
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
    pub enhanced_text: String,
    pub suggestions: Vec<Suggestion>,
    pub status: EnhancementStatus,
}

impl Enhancement {
    fn local(local: &RedactionResult, status: EnhancementStatus) -> Self {
        Self {
            enhanced_text: local.redacted_text().to_string(),
            suggestions: Vec::new(),
            status,
        }
    }

    /// Whether the reviewer's output was used
    pub fn is_enhanced(&self) -> bool {
        matches!(self.status, EnhancementStatus::Enhanced { .. })
    }
}

/// Optional second-pass review of a local redaction
pub struct ReviewerGateway {
    client: Option<Arc<dyn ReviewerClient>>,
    audit: Arc<AuditLog>,
    rules: Arc<PreservationRules>,
    timeout: Duration,
}

impl ReviewerGateway {
    pub fn new(
        client: Arc<dyn ReviewerClient>,
        audit: Arc<AuditLog>,
        rules: Arc<PreservationRules>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Some(client),
            audit,
            rules,
            timeout,
        }
    }

    /// Gateway with no reviewer; every call is skipped and recorded
    pub fn unavailable(audit: Arc<AuditLog>, rules: Arc<PreservationRules>) -> Self {
        Self {
            client: None,
            audit,
            rules,
            timeout: Duration::ZERO,
        }
    }

    /// Build from configuration
    ///
    /// A missing credential yields an unavailable gateway rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(
        config: &ReviewerConfig,
        audit: Arc<AuditLog>,
        rules: Arc<PreservationRules>,
    ) -> Result<Self> {
        match HttpReviewerClient::new(config) {
            Ok(client) => {
                tracing::info!(endpoint = %client.endpoint(), "Reviewer gateway configured");
                Ok(Self::new(
                    Arc::new(client),
                    audit,
                    rules,
                    Duration::from_secs(config.timeout_seconds),
                ))
            }
            Err(ReviewerError::Unavailable(reason)) => {
                tracing::warn!(reason = %reason, "Reviewer unavailable, enhancement disabled");
                Ok(Self::unavailable(audit, rules))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Review `local`, the redaction of `original`
    ///
    /// # Errors
    ///
    /// Only an audit storage failure is returned as an error.
    pub async fn enhance(&self, original: &str, local: &RedactionResult) -> Result<Enhancement> {
        let (_tx, rx) = watch::channel(false);
        self.enhance_with_cancel(original, local, rx).await
    }

    /// [`enhance`](Self::enhance) that stops early when `cancel` turns true
    pub async fn enhance_with_cancel(
        &self,
        original: &str,
        local: &RedactionResult,
        cancel: watch::Receiver<bool>,
    ) -> Result<Enhancement> {
        if *cancel.borrow() {
            return Ok(Enhancement::local(local, EnhancementStatus::Cancelled));
        }

        let Some(client) = &self.client else {
            let err = ReviewerError::Unavailable("no reviewer credential configured".to_string());
            self.audit.append(AuditEntry::review_failure(&err))?;
            return Ok(Enhancement::local(local, EnhancementStatus::Skipped(err)));
        };

        let call = tokio::time::timeout(self.timeout, client.review(original, local.redacted_text()));
        let outcome = tokio::select! {
            biased;
            _ = wait_for_cancel(cancel) => Err(ReviewerError::Cancelled),
            res = call => res.unwrap_or_else(|_| {
                Err(ReviewerError::Transport(format!(
                    "review timed out after {}s",
                    self.timeout.as_secs()
                )))
            }),
        };

        match outcome.and_then(|response| self.validate(original, local, response)) {
            Ok(enhancement) => {
                self.record_success(&enhancement)?;
                Ok(enhancement)
            }
            Err(ReviewerError::Cancelled) => {
                tracing::debug!("Review cancelled by caller");
                Ok(Enhancement::local(local, EnhancementStatus::Cancelled))
            }
            Err(err) => {
                crate::log_reviewer_fallback!(err.kind(), &err);
                self.audit.append(AuditEntry::review_failure(&err))?;
                Ok(Enhancement::local(local, EnhancementStatus::Fallback(err)))
            }
        }
    }

    fn validate(
        &self,
        original: &str,
        local: &RedactionResult,
        response: ReviewResponse,
    ) -> std::result::Result<Enhancement, ReviewerError> {
        if let Some(span) = local
            .spans()
            .iter()
            .find(|span| response.enhanced_text.contains(&span.original))
        {
            return Err(ReviewerError::Parse(format!(
                "enhanced text re-exposes a redacted {} span",
                span.category.as_str()
            )));
        }

        let received = response.suggestions.len();
        let suggestions = screen_suggestions(original, local, &self.rules, response.suggestions);
        let dropped = received - suggestions.len() + response.skipped;

        Ok(Enhancement {
            enhanced_text: response.enhanced_text,
            suggestions,
            status: EnhancementStatus::Enhanced { dropped },
        })
    }

    fn record_success(&self, enhancement: &Enhancement) -> Result<()> {
        let dropped = match enhancement.status {
            EnhancementStatus::Enhanced { dropped } => dropped,
            _ => 0,
        };

        let mut batch = Vec::with_capacity(enhancement.suggestions.len() + 1);
        batch.push(AuditEntry::review_success(enhancement.suggestions.len(), dropped));
        batch.extend(enhancement.suggestions.iter().map(AuditEntry::suggestion));

        self.audit.append_batch(batch)?;

        tracing::info!(
            surfaced = enhancement.suggestions.len(),
            dropped,
            "Reviewer enhancement recorded"
        );
        Ok(())
    }
}

impl std::fmt::Debug for ReviewerGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerGateway")
            .field("available", &self.client.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Resolves once `rx` holds `true`; never resolves if the sender is dropped
async fn wait_for_cancel(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
