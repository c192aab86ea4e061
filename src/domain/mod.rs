//! Domain error types for PhiGuard.
//!
//! All fallible library operations return [`Result<T, PhiGuardError>`]:
//!
//! ```rust
//! use phiguard::domain::{PhiGuardError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = phiguard::config::PhiGuardConfig::default();
//!     config.validate().map_err(PhiGuardError::Configuration)?;
//!     Ok(())
//! }
//! ```
//!
//! Reviewer failures are carried by [`ReviewerError`] and are recoverable;
//! audit storage failures are carried by [`AuditError`] and must reach the caller.

pub mod errors;
pub mod result;

pub use errors::{AuditError, PhiGuardError, ReviewerError};
pub use result::Result;
