//! Local suggestion heuristics
//!
//! Rule-based suggestions computed without any network call. They are never
//! applied to a [`RedactionResult`]; callers decide what to do with them.

use crate::domain::{PhiGuardError, Result};
use crate::phi::models::{RedactionResult, Suggestion, SuggestionKind, SuggestionSource};
use crate::phi::preservation::PreservationRules;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

/// HIPAA treats ages above this as identifying
pub const MAX_UNREPORTED_AGE: u32 = 89;

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("pt", "patient"),
    ("hx", "history"),
    ("bp", "blood pressure"),
    ("sob", "shortness of breath"),
    ("prn", "as needed"),
    ("bid", "twice daily"),
    ("htn", "hypertension"),
    ("dm", "diabetes mellitus"),
    ("rx", "prescription"),
    ("dx", "diagnosis"),
];

// Longest phrases first so the alternation prefers them
const LAY_TERMS: &[(&str, &str)] = &[
    ("high blood pressure", "hypertension"),
    ("high blood sugar", "hyperglycemia"),
    ("heart attack", "myocardial infarction"),
    ("stroke", "cerebrovascular accident"),
    ("sugar", "glucose"),
];

/// Rule-based suggestion engine
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    rules: Arc<PreservationRules>,
    abbreviations: Regex,
    lay_terms: Regex,
    ages: Regex,
    courtesy_surname: Regex,
}

impl SuggestionEngine {
    /// Compile the heuristic rules
    pub fn new(rules: Arc<PreservationRules>) -> Result<Self> {
        let words = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(from, _)| regex::escape(from))
                .collect::<Vec<_>>()
                .join("|")
        };

        Ok(Self {
            rules,
            abbreviations: compile(&format!(r"(?i)\b(?:{})\b", words(ABBREVIATIONS)))?,
            lay_terms: compile(&format!(r"(?i)\b(?:{})\b", words(LAY_TERMS)))?,
            ages: compile(
                r"(?i)\b(?:(?P<n1>\d{2,3})[- ]?(?:years?|yrs?|y/o)(?:[- ]old)?|aged?\s+(?P<n2>\d{2,3}))\b",
            )?,
            courtesy_surname: compile(
                r"\b(?:Mr|Mrs|Ms|Miss|Mx)\.?\s+[A-Z][a-z]+(?:-[A-Z][a-z]+)?\b",
            )?,
        })
    }

    /// Suggestions for `original`, given its local redaction
    ///
    /// Output passes [`screen_suggestions`] before it is returned.
    pub fn suggest(&self, original: &str, result: &RedactionResult) -> Vec<Suggestion> {
        let mut out = Vec::new();

        self.abbreviation_suggestions(original, &mut out);
        self.lay_term_suggestions(original, &mut out);
        self.age_suggestions(original, &mut out);
        self.surname_suggestions(original, result, &mut out);

        screen_suggestions(original, result, &self.rules, out)
    }

    fn abbreviation_suggestions(&self, text: &str, out: &mut Vec<Suggestion>) {
        let mut seen = HashSet::new();
        for m in self.abbreviations.find_iter(text) {
            let key = m.as_str().to_lowercase();
            let Some((_, expansion)) = ABBREVIATIONS.iter().find(|(a, _)| *a == key) else {
                continue;
            };
            if seen.insert(key) {
                out.push(Suggestion::new(
                    SuggestionKind::Improvement,
                    m.as_str(),
                    *expansion,
                    0.6,
                    format!("Expand abbreviation '{}' for clarity", m.as_str()),
                    SuggestionSource::Local,
                ));
            }
        }
    }

    fn lay_term_suggestions(&self, text: &str, out: &mut Vec<Suggestion>) {
        let mut seen = HashSet::new();
        for m in self.lay_terms.find_iter(text) {
            let key = m.as_str().to_lowercase();
            let Some((_, clinical)) = LAY_TERMS.iter().find(|(t, _)| *t == key) else {
                continue;
            };
            if seen.insert(key) {
                out.push(Suggestion::new(
                    SuggestionKind::MedicalTerm,
                    m.as_str(),
                    *clinical,
                    0.7,
                    format!("Use the clinical term for '{}'", m.as_str()),
                    SuggestionSource::Local,
                ));
            }
        }
    }

    fn age_suggestions(&self, text: &str, out: &mut Vec<Suggestion>) {
        for caps in self.ages.captures_iter(text) {
            let age = caps
                .name("n1")
                .or_else(|| caps.name("n2"))
                .and_then(|n| n.as_str().parse::<u32>().ok());

            if let (Some(age), Some(whole)) = (age, caps.get(0)) {
                if age > MAX_UNREPORTED_AGE {
                    out.push(Suggestion::new(
                        SuggestionKind::PotentialPhi,
                        whole.as_str(),
                        "90 or older",
                        0.75,
                        "Ages over 89 are identifying and should be aggregated",
                        SuggestionSource::Local,
                    ));
                }
            }
        }
    }

    fn surname_suggestions(&self, text: &str, result: &RedactionResult, out: &mut Vec<Suggestion>) {
        for m in self.courtesy_surname.find_iter(text) {
            let masked = result.spans().iter().any(|s| s.overlaps(m.start(), m.end()));
            if !masked {
                out.push(Suggestion::new(
                    SuggestionKind::PotentialPhi,
                    m.as_str(),
                    "[NAME]",
                    0.65,
                    "Courtesy title followed by a surname likely identifies a person",
                    SuggestionSource::Local,
                ));
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| PhiGuardError::Configuration(format!("Invalid heuristic pattern: {e}")))
}

/// Drop suggestions that are not admissible for `original`
///
/// Applied to local and reviewer suggestions alike. A suggestion is dropped
/// when its text:
/// - is blank, or does not occur in the original text
/// - occurs only inside already-masked spans
/// - is a potential-PHI claim the preservation rules allow
pub fn screen_suggestions(
    original: &str,
    local: &RedactionResult,
    rules: &PreservationRules,
    suggestions: Vec<Suggestion>,
) -> Vec<Suggestion> {
    let total = suggestions.len();

    let kept: Vec<Suggestion> = suggestions
        .into_iter()
        .filter(|s| {
            let needle = s.text.trim();
            if needle.is_empty() {
                return false;
            }
            if s.kind == SuggestionKind::PotentialPhi && rules.is_preserved(needle) {
                return false;
            }
            original.match_indices(needle).any(|(start, matched)| {
                let end = start + matched.len();
                !local.spans().iter().any(|span| span.overlaps(start, end))
            })
        })
        .collect();

    if kept.len() < total {
        tracing::debug!(
            dropped = total - kept.len(),
            kept = kept.len(),
            "Dropped inadmissible suggestions"
        );
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::models::PhiCategory;
    use crate::phi::{RedactOptions, Redactor};

    fn engine() -> (SuggestionEngine, Redactor) {
        let redactor = Redactor::builtin().unwrap();
        let engine = SuggestionEngine::new(redactor.rules().clone()).unwrap();
        (engine, redactor)
    }

    fn suggest(text: &str) -> Vec<Suggestion> {
        let (engine, redactor) = engine();
        let result = redactor.redact(text, &RedactOptions::default());
        engine.suggest(text, &result)
    }

    #[test]
    fn test_abbreviation_expansion() {
        let suggestions = suggest("Pt has hx of HTN, pt stable");
        let improvements: Vec<&str> = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::Improvement)
            .map(|s| s.suggestion.as_str())
            .collect();

        assert_eq!(improvements, vec!["patient", "history", "hypertension"]);
    }

    #[test]
    fn test_lay_terms() {
        let suggestions = suggest("History of high blood pressure and a heart attack");
        let terms: Vec<&str> = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::MedicalTerm)
            .map(|s| s.suggestion.as_str())
            .collect();

        assert_eq!(terms, vec!["hypertension", "myocardial infarction"]);
    }

    #[test]
    fn test_age_over_89_is_flagged() {
        let suggestions = suggest("A 92-year-old woman and her 45-year-old son");
        let phi: Vec<&Suggestion> = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::PotentialPhi)
            .collect();

        assert_eq!(phi.len(), 1);
        assert_eq!(phi[0].text, "92-year-old");
    }

    #[test]
    fn test_courtesy_surname_is_flagged() {
        let suggestions = suggest("Mr. Jones reports less pain");
        assert!(suggestions
            .iter()
            .any(|s| s.kind == SuggestionKind::PotentialPhi && s.text == "Mr. Jones"));
    }

    #[test]
    fn test_screen_drops_masked_and_absent_text() {
        let (_, redactor) = engine();
        let text = "Call John Smith at 555-123-4567";
        let result = redactor.redact(text, &RedactOptions::default());
        assert_eq!(result.count(PhiCategory::Phone), 1);

        let candidates = vec![
            Suggestion::new(SuggestionKind::PotentialPhi, "555-123-4567", "[PHONE]", 0.9, "", SuggestionSource::Reviewer),
            Suggestion::new(SuggestionKind::PotentialPhi, "Jane Doe", "[NAME]", 0.9, "", SuggestionSource::Reviewer),
            Suggestion::new(SuggestionKind::Improvement, "Call", "Contact", 0.5, "", SuggestionSource::Reviewer),
        ];
        let kept = screen_suggestions(text, &result, redactor.rules(), candidates);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "Call");
    }

    #[test]
    fn test_screen_drops_preserved_phi_claims() {
        let (_, redactor) = engine();
        let text = "Blood Pressure is stable";
        let result = redactor.redact(text, &RedactOptions::default());

        let candidates = vec![Suggestion::new(
            SuggestionKind::PotentialPhi,
            "Blood Pressure",
            "[NAME]",
            0.8,
            "looks like a name",
            SuggestionSource::Reviewer,
        )];
        assert!(screen_suggestions(text, &result, redactor.rules(), candidates).is_empty());
    }
}
