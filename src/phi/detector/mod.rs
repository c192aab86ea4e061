//! PHI detection module
//!
//! Provides the trait-based detection interface and the regex implementation.
//! The [`PatternCatalog`] owns an ordered set of detectors; the redactor only
//! sees [`Candidate`]s, so a statistical detector can be dropped in behind
//! [`PhiDetector`] without touching overlap resolution.

pub mod catalog;
pub mod patterns;
pub mod regex;

pub use catalog::PatternCatalog;
pub use self::regex::{MatchRange, Matcher, RegexDetector};

use crate::phi::models::PhiCategory;

/// Raw match produced by a detector, before preservation and overlap filtering
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Category of PHI
    pub category: PhiCategory,
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Replacement label
    pub label: String,
    /// Base confidence of the detector
    pub confidence: f32,
    /// Overlap priority of the detector (lower wins)
    pub priority: u32,
    /// Detector name
    pub detector: String,
}

impl Candidate {
    /// Text covered by the candidate
    pub fn text<'t>(&self, input: &'t str) -> &'t str {
        &input[self.start..self.end]
    }
}

/// Output of a single detector run
#[derive(Debug, Default)]
pub struct DetectorScan {
    /// Candidates found, in order of occurrence
    pub candidates: Vec<Candidate>,
    /// Non-fatal problems hit while scanning
    pub warnings: Vec<String>,
}

/// Verdict on a candidate during a guided scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Review {
    /// Keep the candidate and continue after its match
    Accept,
    /// Drop the candidate and everything its match covered
    Skip,
    /// Drop the candidate and search again from this byte offset
    ///
    /// Detectors always move past the start of the rejected match, so words
    /// inside it are matched again.
    Rescan(usize),
}

/// Trait for PHI detector implementations
pub trait PhiDetector: Send + Sync {
    /// Unique detector name
    fn name(&self) -> &str;

    /// Category this detector emits
    fn category(&self) -> PhiCategory;

    /// Overlap priority (lower wins)
    fn priority(&self) -> u32;

    /// Base confidence assigned to every candidate
    fn base_confidence(&self) -> f32;

    /// Scan text for candidates
    fn scan(&self, text: &str) -> DetectorScan;

    /// Scan text, letting `review` decide on each candidate as it is found
    ///
    /// Returns the accepted candidates. The default runs [`scan`](Self::scan)
    /// and filters; detectors that can resume matching mid-text override it
    /// to honor [`Review::Rescan`].
    fn scan_with(&self, text: &str, review: &mut dyn FnMut(&Candidate) -> Review) -> DetectorScan {
        let mut scan = self.scan(text);
        scan.candidates.retain(|c| review(c) == Review::Accept);
        scan
    }
}
