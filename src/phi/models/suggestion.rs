//! Suggestion models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Text that may identify a patient and was not masked
    PotentialPhi,
    /// Lay wording with a standard clinical equivalent
    MedicalTerm,
    /// Wording improvement (abbreviation expansion, clarity)
    Improvement,
}

impl SuggestionKind {
    /// Parse a wire `type` value, accepting snake, kebab and camel case
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "potentialphi" | "phi" => Some(Self::PotentialPhi),
            "medicalterm" => Some(Self::MedicalTerm),
            "improvement" => Some(Self::Improvement),
            _ => None,
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PotentialPhi => write!(f, "potential_phi"),
            Self::MedicalTerm => write!(f, "medical_term"),
            Self::Improvement => write!(f, "improvement"),
        }
    }
}

/// Where a suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Local heuristics
    Local,
    /// External reviewer
    Reviewer,
}

impl fmt::Display for SuggestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Reviewer => write!(f, "reviewer"),
        }
    }
}

/// A proposed change that callers may accept or reject
///
/// Suggestions never mutate a [`RedactionResult`](super::RedactionResult).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Kind of suggestion
    pub kind: SuggestionKind,
    /// Source text the suggestion refers to
    pub text: String,
    /// Suggested replacement
    pub suggestion: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Human-readable rationale
    pub reason: String,
    /// Origin of the suggestion
    pub source: SuggestionSource,
}

impl Suggestion {
    /// Create a new suggestion
    pub fn new(
        kind: SuggestionKind,
        text: impl Into<String>,
        suggestion: impl Into<String>,
        confidence: f32,
        reason: impl Into<String>,
        source: SuggestionSource,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            suggestion: suggestion.into(),
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            source,
        }
    }
}
