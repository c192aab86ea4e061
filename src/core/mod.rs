//! Core orchestration for PhiGuard.
//!
//! # Modules
//!
//! - [`audit`] - Bounded append-only audit log, JSONL export and retention
//! - [`compliance`] - Scored reports over audit activity
//! - [`review`] - Optional external review of local redactions
//! - [`pipeline`] - Redaction, audit and review wired together
//!
//! # Workflow
//!
//! 1. **Redact**: mask PHI locally and record one audit entry per span
//! 2. **Suggest**: run local heuristics over the original text
//! 3. **Review** (optional): ask the external reviewer for an enhancement
//! 4. **Report**: aggregate the audit trail into a compliance score
//!
//! # Example
//!
//! ```rust,no_run
//! use phiguard::config::load_config;
//! use phiguard::core::pipeline::PhiPipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("phiguard.toml")?;
//! let pipeline = PhiPipeline::new(&config)?;
//!
//! let outcome = pipeline
//!     .process("Call John Smith at 555-123-4567", &pipeline.default_options())
//!     .await?;
//!
//! println!("{}", outcome.final_text());
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod compliance;
pub mod pipeline;
pub mod review;
