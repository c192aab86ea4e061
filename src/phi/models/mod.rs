//! PHI data models

pub mod category;
pub mod span;
pub mod suggestion;

pub use category::PhiCategory;
pub use span::{RedactionResult, RedactionSpan};
pub use suggestion::{Suggestion, SuggestionKind, SuggestionSource};
