//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod redact;
pub mod report;
pub mod validate;
