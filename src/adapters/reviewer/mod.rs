//! External reviewer integration
//!
//! [`ReviewerClient`] is the transport seam used by the
//! [`ReviewerGateway`](crate::core::review::ReviewerGateway). Production code
//! uses [`HttpReviewerClient`]; tests substitute their own implementation.

pub mod client;
pub mod models;

pub use client::HttpReviewerClient;
pub use models::{ReviewRequest, ReviewResponse};

use crate::domain::ReviewerError;
use async_trait::async_trait;

/// Sends a redaction to an external reviewer and returns its enhancement
#[async_trait]
pub trait ReviewerClient: Send + Sync {
    /// Review `redacted`, the local redaction of `original`
    ///
    /// # Errors
    ///
    /// Returns [`ReviewerError::Transport`] for network or HTTP failures and
    /// [`ReviewerError::Parse`] for unusable responses.
    async fn review(&self, original: &str, redacted: &str) -> Result<ReviewResponse, ReviewerError>;
}
