//! Redactor
//!
//! Runs the [`PatternCatalog`] over free text in priority order, drops
//! candidates the [`PreservationRules`] allow or that overlap an accepted span
//! and substitutes labels for the accepted spans. A rejected candidate sends
//! its detector back into the words it covered, so a name following a
//! discarded match is still found.
//!
//! # Examples
//!
//! ```
//! use phiguard::phi::{RedactOptions, Redactor};
//!
//! let redactor = Redactor::builtin()?;
//! let result = redactor.redact(
//!     "Call John Smith at 555-123-4567, MRN: 00012345",
//!     &RedactOptions::default(),
//! );
//!
//! assert_eq!(result.redacted_text(), "Call [NAME] at [PHONE], MRN: [MRN]");
//! # Ok::<(), phiguard::domain::PhiGuardError>(())
//! ```

use crate::config::RedactionConfig;
use crate::domain::Result;
use crate::phi::detector::{Candidate, PatternCatalog, PhiDetector, Review};
use crate::phi::models::{PhiCategory, RedactionResult, RedactionSpan};
use crate::phi::preservation::{PreservationRules, Preserved};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-call redaction options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactOptions {
    /// Mask person names
    pub include_names: bool,
    /// Mask diagnosis and medication mentions
    pub include_clinical_mentions: bool,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            include_names: true,
            include_clinical_mentions: false,
        }
    }
}

impl RedactOptions {
    /// Options taken from the redaction configuration
    pub fn from_config(config: &RedactionConfig) -> Self {
        Self {
            include_names: config.include_names,
            include_clinical_mentions: config.include_clinical_mentions,
        }
    }

    /// Whether a category is scanned under these options
    pub fn covers(&self, category: PhiCategory) -> bool {
        if category == PhiCategory::Name {
            return self.include_names;
        }
        if category.is_clinical_mention() {
            return self.include_clinical_mentions;
        }
        true
    }
}

/// Pure, reentrant redaction over a read-only catalog
///
/// # Thread Safety
///
/// `Redactor` holds only `Arc`s to immutable data and is cheap to clone; any
/// number of tasks may call [`redact`](Self::redact) concurrently.
#[derive(Debug, Clone)]
pub struct Redactor {
    catalog: Arc<PatternCatalog>,
    rules: Arc<PreservationRules>,
}

impl Redactor {
    /// Create a redactor over an existing catalog and rule set
    pub fn new(catalog: Arc<PatternCatalog>, rules: Arc<PreservationRules>) -> Self {
        Self { catalog, rules }
    }

    /// Redactor with the built-in catalog and preservation rules
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(
            Arc::new(PatternCatalog::builtin()?),
            Arc::new(PreservationRules::builtin()?),
        ))
    }

    /// Build the catalog and rules described by the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern library cannot be read or any detector
    /// in it is malformed.
    pub fn from_config(config: &RedactionConfig) -> Result<Self> {
        let catalog = match &config.pattern_library {
            Some(path) => PatternCatalog::from_file(path)?,
            None => PatternCatalog::builtin()?,
        };
        let rules = PreservationRules::with_extras(
            &config.extra_clinical_terms,
            &config.extra_staff_titles,
        )?;

        tracing::debug!(
            detectors = catalog.len(),
            clinical_terms = rules.terms().len(),
            staff_titles = rules.titles().len(),
            "Redactor initialized"
        );

        Ok(Self::new(Arc::new(catalog), Arc::new(rules)))
    }

    /// Detector catalog
    pub fn catalog(&self) -> &Arc<PatternCatalog> {
        &self.catalog
    }

    /// Preservation rules
    pub fn rules(&self) -> &Arc<PreservationRules> {
        &self.rules
    }

    /// Redact PHI from text
    ///
    /// Never fails: any input, including the empty string, yields a valid
    /// result. Bytes outside accepted spans are copied verbatim.
    pub fn redact(&self, text: &str, options: &RedactOptions) -> RedactionResult {
        if text.is_empty() {
            return RedactionResult::unchanged(text);
        }

        let mut accepted: BTreeMap<usize, Candidate> = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut preserved = 0usize;

        let detectors = self
            .catalog
            .detectors()
            .iter()
            .filter(|d| options.covers(d.category()));

        for detector in detectors {
            let scan = detector.scan_with(text, &mut |candidate: &Candidate| {
                match self.rules.classify(candidate.text(text)) {
                    Some(Preserved::StaffReference) => {
                        preserved += 1;
                        return Review::Skip;
                    }
                    Some(Preserved::ClinicalTerm { end }) => {
                        preserved += 1;
                        return Review::Rescan(candidate.start + end);
                    }
                    None => {}
                }

                if collides(&accepted, candidate) {
                    return Review::Rescan(candidate.start);
                }
                accepted.insert(candidate.start, candidate.clone());
                Review::Accept
            });
            warnings.extend(scan.warnings);
        }

        let spans: Vec<RedactionSpan> = accepted
            .into_values()
            .map(|c| RedactionSpan {
                category: c.category,
                original: text[c.start..c.end].to_string(),
                start: c.start,
                end: c.end,
                label: c.label,
                confidence: c.confidence,
                detector: c.detector,
            })
            .collect();

        let result = RedactionResult::from_spans(text, spans, warnings);

        tracing::debug!(
            spans = result.total_spans(),
            preserved,
            confidence = result.confidence(),
            warnings = result.warnings().len(),
            "Redaction pass complete"
        );

        result
    }

    /// Redact PHI from raw bytes
    ///
    /// Malformed UTF-8 is replaced with U+FFFD first; span offsets refer to the
    /// decoded text.
    pub fn redact_bytes(&self, bytes: &[u8], options: &RedactOptions) -> RedactionResult {
        let text: Cow<'_, str> = String::from_utf8_lossy(bytes);
        self.redact(&text, options)
    }
}

/// Whether a candidate overlaps an accepted span
///
/// Accepted spans are keyed by start offset and never overlap, so only the
/// nearest span starting before the candidate's end can collide with it.
fn collides(accepted: &BTreeMap<usize, Candidate>, candidate: &Candidate) -> bool {
    accepted
        .range(..candidate.end)
        .next_back()
        .is_some_and(|(_, prev)| prev.end > candidate.start)
}
