//! Preservation rules
//!
//! Allow-list of clinical vocabulary and staff titles. A detector candidate
//! that contains one of these is legitimate clinical text and is dropped before
//! it can be counted or masked.

use crate::domain::{PhiGuardError, Result};
use regex::{Regex, RegexBuilder};

/// Clinical vocabulary that regularly looks like a capitalised name
pub const DEFAULT_CLINICAL_TERMS: &[&str] = &[
    "blood pressure",
    "heart rate",
    "respiratory rate",
    "oxygen saturation",
    "vital signs",
    "temperature",
    "pulse",
    "chest pain",
    "shortness of breath",
    "physical exam",
    "physical examination",
    "review of systems",
    "chief complaint",
    "present illness",
    "medical history",
    "family history",
    "social history",
    "emergency department",
    "emergency room",
    "intensive care",
    "primary care",
    "urgent care",
    "sinus rhythm",
    "general appearance",
    "lab results",
    "white blood",
    "red blood",
    "blood glucose",
    "hemoglobin",
    "follow up",
    "discharge summary",
    "progress note",
    "care plan",
    "no acute distress",
];

/// Staff titles matched as whole tokens
pub const DEFAULT_STAFF_TITLES: &[&str] = &[
    "Dr",
    "Doctor",
    "Nurse",
    "RN",
    "NP",
    "MD",
    "Prof",
    "Professor",
    "Attending",
    "Resident",
    "Physician",
    "Surgeon",
    "Therapist",
    "Pharmacist",
    "Technician",
];

/// Why a candidate stays visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preserved {
    /// A staff title makes the whole candidate a staff reference
    StaffReference,
    /// A clinical term ends at this byte offset within the candidate; text
    /// after it is still open to detection
    ClinicalTerm { end: usize },
}

/// Case-insensitive, word-bounded allow-list
#[derive(Debug, Clone)]
pub struct PreservationRules {
    terms: Vec<String>,
    titles: Vec<String>,
    term_matcher: Option<Regex>,
    title_matcher: Option<Regex>,
}

impl PreservationRules {
    /// Build rules from explicit term and title lists
    pub fn new<T, S>(terms: T, titles: S) -> Result<Self>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let terms = normalize(terms);
        let titles = normalize(titles);

        Ok(Self {
            term_matcher: compile(&terms)?,
            title_matcher: compile(&titles)?,
            terms,
            titles,
        })
    }

    /// Built-in clinical terms and staff titles
    pub fn builtin() -> Result<Self> {
        Self::with_extras(&[], &[])
    }

    /// Built-in lists extended with additional entries
    pub fn with_extras(extra_terms: &[String], extra_titles: &[String]) -> Result<Self> {
        let terms = DEFAULT_CLINICAL_TERMS
            .iter()
            .map(|t| t.to_string())
            .chain(extra_terms.iter().cloned());
        let titles = DEFAULT_STAFF_TITLES
            .iter()
            .map(|t| t.to_string())
            .chain(extra_titles.iter().cloned());
        Self::new(terms, titles)
    }

    /// Whether the candidate contains a clinical term or staff-title token
    pub fn is_preserved(&self, candidate: &str) -> bool {
        self.classify(candidate).is_some()
    }

    /// Classify a candidate against the allow-list
    ///
    /// A staff title wins over a clinical term. For clinical terms the offset
    /// is the end of the last term in the candidate.
    pub fn classify(&self, candidate: &str) -> Option<Preserved> {
        if self
            .title_matcher
            .as_ref()
            .is_some_and(|m| m.is_match(candidate))
        {
            return Some(Preserved::StaffReference);
        }

        self.term_matcher
            .as_ref()
            .and_then(|m| m.find_iter(candidate).last())
            .map(|m| Preserved::ClinicalTerm { end: m.end() })
    }

    /// Clinical terms, lower-cased
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Staff titles, lower-cased
    pub fn titles(&self) -> &[String] {
        &self.titles
    }
}

fn normalize<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut out: Vec<String> = items
        .into_iter()
        .map(|s| s.into().trim().trim_end_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn compile(phrases: &[String]) -> Result<Option<Regex>> {
    if phrases.is_empty() {
        return Ok(None);
    }

    let alternatives: Vec<String> = phrases.iter().map(|p| escape_phrase(p)).collect();
    let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| PhiGuardError::Configuration(format!("Invalid preservation rules: {e}")))
}

// Multi-word terms tolerate any run of whitespace between words
fn escape_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Blood Pressure" ; "title case term")]
    #[test_case("BLOOD PRESSURE" ; "upper case term")]
    #[test_case("blood\n pressure" ; "term split over whitespace")]
    #[test_case("Dr. Jane Smith" ; "title with period")]
    #[test_case("Nurse Ratched" ; "nurse title")]
    #[test_case("Jane Smith MD" ; "trailing credential")]
    fn test_preserved(candidate: &str) {
        let rules = PreservationRules::builtin().unwrap();
        assert!(rules.is_preserved(candidate));
    }

    #[test_case("John Smith" ; "plain name")]
    #[test_case("Andrew Jones" ; "title inside word")]
    #[test_case("Mr. Drummond" ; "title prefix of surname")]
    #[test_case("555-123-4567" ; "phone")]
    fn test_not_preserved(candidate: &str) {
        let rules = PreservationRules::builtin().unwrap();
        assert!(!rules.is_preserved(candidate));
    }

    #[test]
    fn test_extras_are_added() {
        let rules = PreservationRules::with_extras(
            &["Glasgow Coma Scale".to_string()],
            &["Midwife.".to_string()],
        )
        .unwrap();

        assert!(rules.is_preserved("Glasgow Coma Scale"));
        assert!(!rules.is_preserved("Glasgow Coma"));
        assert!(rules.is_preserved("glasgow coma scale"));
        assert!(rules.is_preserved("Midwife Baker"));
        assert!(rules.titles().contains(&"midwife".to_string()));
    }

    #[test]
    fn test_classify() {
        let rules = PreservationRules::builtin().unwrap();

        assert_eq!(
            rules.classify("Dr. Jane Smith"),
            Some(Preserved::StaffReference)
        );
        assert_eq!(
            rules.classify("Hemoglobin Maria"),
            Some(Preserved::ClinicalTerm { end: 10 })
        );
        assert_eq!(
            rules.classify("Nurse Hemoglobin"),
            Some(Preserved::StaffReference)
        );
        assert_eq!(rules.classify("Maria Lopez"), None);
    }

    #[test]
    fn test_empty_rules_preserve_nothing() {
        let rules = PreservationRules::new(Vec::<String>::new(), Vec::<String>::new()).unwrap();
        assert!(!rules.is_preserved("Blood Pressure"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let rules = PreservationRules::new(vec!["c.diff"], Vec::<String>::new()).unwrap();
        assert!(rules.is_preserved("C.diff colitis"));
        assert!(!rules.is_preserved("cxdiff"));
    }
}
