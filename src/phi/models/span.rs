//! Redaction span and result models

use super::PhiCategory;
use serde::Serialize;
use std::collections::BTreeMap;

/// A located, categorized substring replaced by a fixed label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedactionSpan {
    /// Category of PHI
    pub category: PhiCategory,
    /// Original text covered by the span
    pub original: String,
    /// Start byte offset in the input text
    pub start: usize,
    /// End byte offset (exclusive) in the input text
    pub end: usize,
    /// Replacement label written into the redacted text
    pub label: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Name of the detector that produced the span
    pub detector: String,
}

impl RedactionSpan {
    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether two byte ranges share at least one offset
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Outcome of a single redaction pass
///
/// Built only through [`RedactionResult::from_spans`], which derives the
/// redacted text, counts and confidence from the accepted spans so they can
/// never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedactionResult {
    redacted_text: String,
    spans: Vec<RedactionSpan>,
    counts: BTreeMap<PhiCategory, usize>,
    confidence: f32,
    warnings: Vec<String>,
}

impl RedactionResult {
    /// Build a result from accepted spans
    ///
    /// `spans` must be sorted by `start` and pairwise non-overlapping, with
    /// offsets on `input` char boundaries. Bytes outside the spans are copied
    /// verbatim.
    pub fn from_spans(input: &str, mut spans: Vec<RedactionSpan>, warnings: Vec<String>) -> Self {
        spans.sort_by_key(|s| (s.start, s.end));
        debug_assert!(spans.windows(2).all(|w| w[0].end <= w[1].start));

        let mut redacted_text = String::with_capacity(input.len());
        let mut cursor = 0;
        let mut counts = BTreeMap::new();
        let mut confidence_sum = 0.0f32;

        for span in &spans {
            redacted_text.push_str(&input[cursor..span.start]);
            redacted_text.push_str(&span.label);
            cursor = span.end;

            *counts.entry(span.category).or_insert(0) += 1;
            confidence_sum += span.confidence;
        }
        redacted_text.push_str(&input[cursor..]);

        // Nothing to protect is maximal confidence
        let confidence = if spans.is_empty() {
            1.0
        } else {
            (confidence_sum / spans.len() as f32).clamp(0.0, 1.0)
        };

        Self {
            redacted_text,
            spans,
            counts,
            confidence,
            warnings,
        }
    }

    /// Result for input that contains nothing to redact
    pub fn unchanged(input: &str) -> Self {
        Self::from_spans(input, Vec::new(), Vec::new())
    }

    /// Redacted text
    pub fn redacted_text(&self) -> &str {
        &self.redacted_text
    }

    /// Accepted spans, ordered by start offset
    pub fn spans(&self) -> &[RedactionSpan] {
        &self.spans
    }

    /// Per-category span counts (absent categories are zero)
    pub fn counts(&self) -> &BTreeMap<PhiCategory, usize> {
        &self.counts
    }

    /// Number of spans for a category
    pub fn count(&self, category: PhiCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Overall confidence (count-weighted mean of span confidences)
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Non-fatal scan warnings
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Total number of spans
    pub fn total_spans(&self) -> usize {
        self.spans.len()
    }

    /// Check if any PHI was redacted
    pub fn has_redactions(&self) -> bool {
        !self.spans.is_empty()
    }

    /// Map a byte offset in the redacted text back to the span covering it, if any
    pub fn span_at_redacted_offset(&self, offset: usize) -> Option<&RedactionSpan> {
        let mut shift: isize = 0;
        for span in &self.spans {
            let redacted_start = (span.start as isize + shift) as usize;
            let redacted_end = redacted_start + span.label.len();
            if offset < redacted_start {
                return None;
            }
            if offset < redacted_end {
                return Some(span);
            }
            shift += span.label.len() as isize - span.len() as isize;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(category: PhiCategory, input: &str, start: usize, end: usize, confidence: f32) -> RedactionSpan {
        RedactionSpan {
            category,
            original: input[start..end].to_string(),
            start,
            end,
            label: category.label().to_string(),
            confidence,
            detector: "test".to_string(),
        }
    }

    #[test]
    fn test_from_spans_builds_redacted_text() {
        let input = "Call 555-123-4567 or mail a@b.io";
        let spans = vec![
            span(PhiCategory::Email, input, 26, 32, 0.9),
            span(PhiCategory::Phone, input, 5, 17, 0.7),
        ];

        let result = RedactionResult::from_spans(input, spans, Vec::new());

        assert_eq!(result.redacted_text(), "Call [PHONE] or mail [EMAIL]");
        assert_eq!(result.spans()[0].category, PhiCategory::Phone);
        assert_eq!(result.count(PhiCategory::Phone), 1);
        assert_eq!(result.count(PhiCategory::Name), 0);
        assert!((result.confidence() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_empty_result_has_full_confidence() {
        let result = RedactionResult::unchanged("");
        assert_eq!(result.redacted_text(), "");
        assert_eq!(result.confidence(), 1.0);
        assert!(!result.has_redactions());
    }

    #[test]
    fn test_touching_spans_are_both_applied() {
        let input = "ab";
        let spans = vec![
            span(PhiCategory::Name, input, 0, 1, 1.0),
            span(PhiCategory::Phone, input, 1, 2, 1.0),
        ];
        let result = RedactionResult::from_spans(input, spans, Vec::new());
        assert_eq!(result.redacted_text(), "[NAME][PHONE]");
    }

    #[test]
    fn test_span_at_redacted_offset() {
        let input = "x 555-123-4567 y";
        let result = RedactionResult::from_spans(
            input,
            vec![span(PhiCategory::Phone, input, 2, 14, 0.9)],
            Vec::new(),
        );
        // "x [PHONE] y"
        assert!(result.span_at_redacted_offset(0).is_none());
        assert_eq!(
            result.span_at_redacted_offset(3).map(|s| s.category),
            Some(PhiCategory::Phone)
        );
        assert!(result.span_at_redacted_offset(10).is_none());
    }
}
