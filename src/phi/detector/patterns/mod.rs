//! Pattern library for PHI detection

use crate::domain::{PhiGuardError, Result};
use crate::phi::detector::regex::{Matcher, RegexDetector};
use crate::phi::models::PhiCategory;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Built-in pattern library
pub const DEFAULT_PATTERNS: &str = include_str!("../../../../patterns/phi_patterns.toml");

/// Detector definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorDefinition {
    /// Unique detector name
    pub name: String,
    /// PHI category
    pub category: String,
    /// Replacement label (defaults to the category label)
    #[serde(default)]
    pub label: Option<String>,
    /// Base confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Overlap priority (defaults to the category priority)
    #[serde(default)]
    pub priority: Option<u32>,
    /// Regex patterns
    pub patterns: Vec<String>,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
pub struct PatternLibrary {
    #[serde(default)]
    pub detectors: Vec<DetectorDefinition>,
}

impl PatternLibrary {
    /// Parse a library from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PhiGuardError::Catalog(format!("Failed to parse pattern library: {e}")))
    }

    /// Read a library from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PhiGuardError::Catalog(format!(
                "Failed to read pattern library {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Built-in library
    pub fn builtin() -> Result<Self> {
        Self::from_toml(DEFAULT_PATTERNS)
    }

    /// Compile every definition, failing on the first invalid one
    pub fn compile(&self) -> Result<Vec<RegexDetector>> {
        let mut seen = HashSet::new();
        let mut detectors = Vec::with_capacity(self.detectors.len());

        for def in &self.detectors {
            if !seen.insert(def.name.as_str()) {
                return Err(PhiGuardError::Catalog(format!(
                    "Duplicate detector name '{}'",
                    def.name
                )));
            }
            detectors.push(def.compile()?);
        }

        Ok(detectors)
    }
}

impl DetectorDefinition {
    /// Validate and compile the definition
    pub fn compile(&self) -> Result<RegexDetector> {
        let category: PhiCategory = self.category.parse().map_err(|e| {
            PhiGuardError::Catalog(format!("Detector '{}': {e}", self.name))
        })?;

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(PhiGuardError::Catalog(format!(
                "Detector '{}': confidence {} is outside [0, 1]",
                self.name, self.confidence
            )));
        }

        if self.patterns.is_empty() {
            return Err(PhiGuardError::Catalog(format!(
                "Detector '{}' has no patterns",
                self.name
            )));
        }

        let matchers = self
            .patterns
            .iter()
            .map(|pattern| {
                Matcher::compile(pattern).map_err(|e| {
                    PhiGuardError::Catalog(format!(
                        "Invalid pattern in detector '{}': {pattern}: {e}",
                        self.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut detector = RegexDetector::new(&self.name, category, self.confidence, matchers);
        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(PhiGuardError::Catalog(format!(
                    "Detector '{}' has an empty label",
                    self.name
                )));
            }
            detector = detector.with_label(label);
        }
        if let Some(priority) = self.priority {
            detector = detector.with_priority(priority);
        }

        Ok(detector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::detector::PhiDetector;

    #[test]
    fn test_builtin_library_compiles() {
        let detectors = PatternLibrary::builtin().unwrap().compile().unwrap();
        let categories: HashSet<PhiCategory> = detectors.iter().map(|d| d.category()).collect();

        for category in PhiCategory::ALL {
            assert!(categories.contains(&category), "missing {category}");
        }
    }

    #[test]
    fn test_builtin_name_pattern_uses_extended_engine() {
        let detectors = PatternLibrary::builtin().unwrap().compile().unwrap();
        let name = detectors
            .iter()
            .find(|d| d.category() == PhiCategory::Name)
            .unwrap();
        assert!(name.matchers().iter().all(|m| m.is_extended()));
    }

    #[test]
    fn test_optional_fields() {
        let library = PatternLibrary::from_toml(
            r#"
            [[detectors]]
            name = "badge"
            category = "name"
            label = "[STAFF]"
            confidence = 0.5
            priority = 1
            patterns = ['badge \d+']
            "#,
        )
        .unwrap();
        let detectors = library.compile().unwrap();

        assert_eq!(detectors[0].label(), "[STAFF]");
        assert_eq!(detectors[0].priority(), 1);
    }

    #[test]
    fn test_unknown_category_is_fatal() {
        let library = PatternLibrary::from_toml(
            r#"
            [[detectors]]
            name = "retina"
            category = "biometric"
            confidence = 0.5
            patterns = ['x']
            "#,
        )
        .unwrap();
        let err = library.compile().unwrap_err();
        assert!(matches!(err, PhiGuardError::Catalog(_)));
    }

    #[test]
    fn test_bad_confidence_is_fatal() {
        let library = PatternLibrary::from_toml(
            r#"
            [[detectors]]
            name = "phone"
            category = "phone"
            confidence = 1.5
            patterns = ['\d+']
            "#,
        )
        .unwrap();
        assert!(library.compile().is_err());
    }

    #[test]
    fn test_malformed_pattern_names_detector() {
        let library = PatternLibrary::from_toml(
            r#"
            [[detectors]]
            name = "broken"
            category = "email"
            confidence = 0.9
            patterns = ['([a-z]+']
            "#,
        )
        .unwrap();
        let err = library.compile().unwrap_err().to_string();
        assert!(err.contains("broken"));
    }

    #[test]
    fn test_empty_patterns_and_duplicates_are_fatal() {
        let empty = PatternLibrary::from_toml(
            r#"
            [[detectors]]
            name = "nothing"
            category = "email"
            confidence = 0.9
            patterns = []
            "#,
        )
        .unwrap();
        assert!(empty.compile().is_err());

        let duplicate = PatternLibrary::from_toml(
            r#"
            [[detectors]]
            name = "a"
            category = "email"
            confidence = 0.9
            patterns = ['x']

            [[detectors]]
            name = "a"
            category = "phone"
            confidence = 0.9
            patterns = ['y']
            "#,
        )
        .unwrap();
        assert!(duplicate.compile().is_err());
    }
}
