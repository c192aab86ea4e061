//! Optional external review of local redactions

pub mod gateway;

pub use gateway::{Enhancement, EnhancementStatus, ReviewerGateway};
