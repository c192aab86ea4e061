//! Reviewer wire models
//!
//! The request carries the original and locally redacted text. The response
//! must contain `enhanced_text` and a `suggestions` array; anything else is a
//! parse failure. Unknown fields are ignored.

use crate::domain::ReviewerError;
use crate::phi::models::{Suggestion, SuggestionKind, SuggestionSource};
use serde::{Deserialize, Serialize};

/// Body POSTed to the reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub original_text: String,
    pub current_redacted_text: String,
}

impl ReviewRequest {
    pub fn new(original_text: impl Into<String>, current_redacted_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            current_redacted_text: current_redacted_text.into(),
        }
    }
}

/// Suggestion as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
struct WireSuggestion {
    #[serde(rename = "type")]
    kind: String,
    text: String,
    suggestion: String,
    confidence: f64,
    reason: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WireResponse {
    enhanced_text: String,
    suggestions: Vec<WireSuggestion>,
}

/// Validated reviewer response
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewResponse {
    pub enhanced_text: String,
    pub suggestions: Vec<Suggestion>,
    /// Suggestions skipped for an unrecognised `type`
    pub skipped: usize,
}

impl ReviewResponse {
    /// Parse and validate a response body
    ///
    /// # Errors
    ///
    /// Returns [`ReviewerError::Parse`] if the body is not JSON, a required
    /// field is missing or mistyped, or a confidence is outside `[0, 1]`.
    pub fn from_json(body: &str) -> Result<Self, ReviewerError> {
        let wire: WireResponse = serde_json::from_str(body)
            .map_err(|e| ReviewerError::Parse(format!("Invalid review response: {e}")))?;

        let mut suggestions = Vec::with_capacity(wire.suggestions.len());
        let mut skipped = 0;

        for (idx, item) in wire.suggestions.into_iter().enumerate() {
            if !item.confidence.is_finite() || !(0.0..=1.0).contains(&item.confidence) {
                return Err(ReviewerError::Parse(format!(
                    "suggestion {idx} has confidence {} outside [0, 1]",
                    item.confidence
                )));
            }

            let Some(kind) = SuggestionKind::from_wire(&item.kind) else {
                tracing::warn!(index = idx, kind = %item.kind, "Skipping suggestion with unknown type");
                skipped += 1;
                continue;
            };

            suggestions.push(Suggestion::new(
                kind,
                item.text,
                item.suggestion,
                item.confidence as f32,
                item.reason,
                SuggestionSource::Reviewer,
            ));
        }

        Ok(Self {
            enhanced_text: wire.enhanced_text,
            suggestions,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_field_names() {
        let body = serde_json::to_value(ReviewRequest::new("a", "b")).unwrap();
        assert_eq!(body, json!({"original_text": "a", "current_redacted_text": "b"}));
    }

    #[test]
    fn test_valid_response_with_extra_fields() {
        let body = json!({
            "enhanced_text": "Call [NAME].",
            "model": "ignored",
            "suggestions": [{
                "type": "potential_phi",
                "text": "Jones",
                "suggestion": "[NAME]",
                "confidence": 0.8,
                "reason": "surname",
                "extra": true
            }]
        })
        .to_string();

        let parsed = ReviewResponse::from_json(&body).unwrap();
        assert_eq!(parsed.enhanced_text, "Call [NAME].");
        assert_eq!(parsed.suggestions.len(), 1);
        assert_eq!(parsed.suggestions[0].kind, SuggestionKind::PotentialPhi);
        assert_eq!(parsed.suggestions[0].source, SuggestionSource::Reviewer);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        let body = json!({
            "enhanced_text": "x",
            "suggestions": [
                {"type": "tone", "text": "a", "suggestion": "b", "confidence": 0.5, "reason": "r"},
                {"type": "improvement", "text": "pt", "suggestion": "patient", "confidence": 0.5, "reason": "r"}
            ]
        })
        .to_string();

        let parsed = ReviewResponse::from_json(&body).unwrap();
        assert_eq!(parsed.suggestions.len(), 1);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_schema_violations_are_parse_errors() {
        let cases = [
            "not json".to_string(),
            json!({"suggestions": []}).to_string(),
            json!({"enhanced_text": "x"}).to_string(),
            json!({"enhanced_text": "x", "suggestions": {}}).to_string(),
            json!({"enhanced_text": "x", "suggestions": [{"type": "improvement", "text": "a"}]})
                .to_string(),
            json!({"enhanced_text": "x", "suggestions": [
                {"type": "improvement", "text": "a", "suggestion": "b", "confidence": 1.5, "reason": "r"}
            ]})
            .to_string(),
        ];

        for body in cases {
            let err = ReviewResponse::from_json(&body).unwrap_err();
            assert_eq!(err.kind(), "parse", "body: {body}");
        }
    }
}
