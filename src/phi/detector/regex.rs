//! Regex-based PHI detector

use super::{Candidate, DetectorScan, PhiDetector, Review};
use crate::phi::models::PhiCategory;

/// Name of the capture group that narrows a match to the sensitive part
pub const PHI_GROUP: &str = "phi";

/// Compiled pattern
///
/// Patterns compile with the linear-time `regex` engine when they can. Only
/// patterns using look-around or backreferences fall back to `fancy_regex`.
#[derive(Debug, Clone)]
pub enum Matcher {
    Standard(regex::Regex),
    Extended(fancy_regex::Regex),
}

impl Matcher {
    /// Compile a pattern, falling back to the extended engine
    pub fn compile(pattern: &str) -> Result<Self, String> {
        match regex::Regex::new(pattern) {
            Ok(re) => Ok(Self::Standard(re)),
            Err(standard_err) => match fancy_regex::Regex::new(pattern) {
                Ok(re) => Ok(Self::Extended(re)),
                Err(extended_err) => Err(format!(
                    "{standard_err}; extended syntax also rejected it: {extended_err}"
                )),
            },
        }
    }

    /// Whether the pattern needed the extended engine
    pub fn is_extended(&self) -> bool {
        matches!(self, Self::Extended(_))
    }

    /// Source pattern
    pub fn as_str(&self) -> &str {
        match self {
            Self::Standard(re) => re.as_str(),
            Self::Extended(re) => re.as_str(),
        }
    }

    /// First match starting at or after byte offset `pos`
    ///
    /// Look-around and word boundaries still see the text before `pos`.
    /// Extended patterns can hit the backtrack limit, which is returned as an
    /// error.
    pub fn find_from(&self, text: &str, pos: usize) -> Result<Option<MatchRange>, String> {
        if pos > text.len() {
            return Ok(None);
        }

        match self {
            Self::Standard(re) => Ok(re.captures_at(text, pos).and_then(|caps| {
                let whole = caps.get(0)?;
                let whole = (whole.start(), whole.end());
                let phi = caps.name(PHI_GROUP).map_or(whole, |m| (m.start(), m.end()));
                Some(MatchRange { whole, phi })
            })),
            Self::Extended(re) => {
                let caps = re.captures_from_pos(text, pos).map_err(|e| e.to_string())?;
                Ok(caps.and_then(|caps| {
                    let whole = caps.get(0)?;
                    let whole = (whole.start(), whole.end());
                    let phi = caps.name(PHI_GROUP).map_or(whole, |m| (m.start(), m.end()));
                    Some(MatchRange { whole, phi })
                }))
            }
        }
    }
}

/// One pattern match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    /// Whole match, context included
    pub whole: (usize, usize),
    /// Part to mask: the `phi` group when present, the whole match otherwise
    pub phi: (usize, usize),
}

// Offset of the character after the one starting at `i`
fn next_char(text: &str, i: usize) -> usize {
    text.get(i..)
        .and_then(|rest| rest.chars().next())
        .map_or(i + 1, |c| i + c.len_utf8())
}

/// Detector backed by one or more compiled patterns
#[derive(Debug, Clone)]
pub struct RegexDetector {
    name: String,
    category: PhiCategory,
    label: String,
    confidence: f32,
    priority: u32,
    matchers: Vec<Matcher>,
}

impl RegexDetector {
    /// Create a detector
    ///
    /// The label defaults to the category label and the priority to the
    /// category priority.
    pub fn new(
        name: impl Into<String>,
        category: PhiCategory,
        confidence: f32,
        matchers: Vec<Matcher>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            label: category.label().to_string(),
            confidence,
            priority: category.priority(),
            matchers,
        }
    }

    /// Override the replacement label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Override the overlap priority
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Replacement label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Compiled patterns
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    fn candidate(&self, start: usize, end: usize) -> Candidate {
        Candidate {
            category: self.category,
            start,
            end,
            label: self.label.clone(),
            confidence: self.confidence,
            priority: self.priority,
            detector: self.name.clone(),
        }
    }
}

impl PhiDetector for RegexDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> PhiCategory {
        self.category
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn base_confidence(&self) -> f32 {
        self.confidence
    }

    fn scan(&self, text: &str) -> DetectorScan {
        let mut scan = self.scan_with(text, &mut |_| Review::Accept);

        // Several patterns of one detector may hit the same range
        scan.candidates.sort_by_key(|c| (c.start, c.end));
        scan.candidates
            .dedup_by(|a, b| a.start == b.start && a.end == b.end);

        scan
    }

    fn scan_with(&self, text: &str, review: &mut dyn FnMut(&Candidate) -> Review) -> DetectorScan {
        let mut scan = DetectorScan::default();

        for matcher in &self.matchers {
            let mut pos = 0;
            while pos <= text.len() {
                let found = match matcher.find_from(text, pos) {
                    Ok(Some(found)) => found,
                    Ok(None) => break,
                    Err(error) => {
                        tracing::warn!(
                            detector = %self.name,
                            error = %error,
                            "Pattern scan aborted, keeping matches found so far"
                        );
                        scan.warnings
                            .push(format!("detector '{}' stopped early: {error}", self.name));
                        break;
                    }
                };

                let (whole_start, whole_end) = found.whole;
                let retry_at = next_char(text, whole_start);
                let (start, end) = found.phi;
                if start == end {
                    pos = if whole_end > whole_start { whole_end } else { retry_at };
                    continue;
                }

                let candidate = self.candidate(start, end);
                pos = match review(&candidate) {
                    Review::Accept => {
                        scan.candidates.push(candidate);
                        whole_end
                    }
                    Review::Skip => whole_end,
                    Review::Rescan(from) => from.max(retry_at),
                };
            }
        }

        scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(category: PhiCategory, patterns: &[&str]) -> RegexDetector {
        let matchers = patterns
            .iter()
            .map(|p| Matcher::compile(p).unwrap())
            .collect();
        RegexDetector::new("test", category, 0.9, matchers)
    }

    #[test]
    fn test_standard_pattern_compiles_with_regex() {
        let matcher = Matcher::compile(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
        assert!(!matcher.is_extended());
    }

    #[test]
    fn test_lookahead_falls_back_to_extended() {
        let matcher = Matcher::compile(r"\b(?!Call\b)[A-Z][a-z]+").unwrap();
        assert!(matcher.is_extended());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(Matcher::compile(r"(unclosed").is_err());
    }

    #[test]
    fn test_phi_group_narrows_span() {
        let d = detector(
            PhiCategory::MedicalRecordNumber,
            &[r"(?i)\bMRN[:#]?\s*(?P<phi>\d{6,10})\b"],
        );
        let text = "MRN: 00012345";
        let scan = d.scan(text);

        assert_eq!(scan.candidates.len(), 1);
        assert_eq!(scan.candidates[0].text(text), "00012345");
        assert_eq!(scan.candidates[0].label, "[MRN]");
    }

    #[test]
    fn test_phi_group_in_extended_pattern() {
        let d = detector(
            PhiCategory::InsuranceId,
            &[r"(?i)member id:\s*(?P<phi>(?=[A-Z-]*\d)[A-Z0-9-]{6,})"],
        );
        let text = "Member ID: XKB-449210";
        let scan = d.scan(text);

        assert_eq!(scan.candidates.len(), 1);
        assert_eq!(scan.candidates[0].text(text), "XKB-449210");
    }

    #[test]
    fn test_duplicate_ranges_are_merged() {
        let d = detector(PhiCategory::Phone, &[r"\d{3}-\d{4}", r"\d{3}-\d{4}"]);
        let scan = d.scan("555-1234");
        assert_eq!(scan.candidates.len(), 1);
    }

    #[test]
    fn test_find_from_respects_preceding_text() {
        let matcher = Matcher::compile(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b").unwrap();
        let text = "Maple Grove Sarah Jones";

        let found = matcher.find_from(text, 1).unwrap().unwrap();
        assert_eq!(found.whole, (6, 17));
        assert_eq!(found.phi, found.whole);
        assert!(matcher.find_from(text, text.len() + 1).unwrap().is_none());
    }

    #[test]
    fn test_rescan_resumes_inside_rejected_match() {
        let d = detector(PhiCategory::Name, &[r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b"]);
        let text = "Road Sarah Jones";

        let mut seen = Vec::new();
        let scan = d.scan_with(text, &mut |c| {
            seen.push(c.text(text).to_string());
            if c.start == 0 {
                Review::Rescan(c.start)
            } else {
                Review::Accept
            }
        });

        assert_eq!(seen, vec!["Road Sarah", "Sarah Jones"]);
        assert_eq!(scan.candidates.len(), 1);
        assert_eq!(scan.candidates[0].text(text), "Sarah Jones");
    }

    #[test]
    fn test_skip_moves_past_whole_match() {
        let d = detector(PhiCategory::Name, &[r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b"]);
        let text = "Nurse Ratched Jones";

        let mut seen = 0;
        let scan = d.scan_with(text, &mut |_| {
            seen += 1;
            Review::Skip
        });

        assert_eq!(seen, 1);
        assert!(scan.candidates.is_empty());
    }

    #[test]
    fn test_overrides() {
        let d = detector(PhiCategory::Email, &[r"\S+@\S+"])
            .with_label("[CONTACT]")
            .with_priority(5);
        assert_eq!(d.label(), "[CONTACT]");
        assert_eq!(d.priority(), 5);
    }
}
