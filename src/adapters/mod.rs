//! External system integrations for PhiGuard.
//!
//! - [`reviewer`] - External PHI reviewer over HTTPS
//!
//! Adapters isolate network dependencies behind traits so the core can be
//! tested with mock implementations:
//!
//! ```rust,no_run
//! use phiguard::adapters::reviewer::{HttpReviewerClient, ReviewerClient};
//! use phiguard::config::{secret_string, ReviewerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReviewerConfig {
//!     enabled: true,
//!     endpoint: Some("https://reviewer.example.com/v1/review".to_string()),
//!     api_key: Some(secret_string("sk-example".to_string())),
//!     ..ReviewerConfig::default()
//! };
//!
//! let client = HttpReviewerClient::new(&config)?;
//! let response = client.review("Call John Smith", "Call [NAME]").await?;
//! println!("{}", response.enhanced_text);
//! # Ok(())
//! # }
//! ```

pub mod reviewer;
