//! Ordered detector catalog

use super::patterns::PatternLibrary;
use super::{Candidate, DetectorScan, PhiDetector};
use crate::domain::Result;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Immutable, priority-ordered set of detectors
///
/// Detectors are ordered by `(priority, registration index)`: an explicit
/// priority decides, and registration order only breaks ties between
/// detectors that share one.
#[derive(Clone)]
pub struct PatternCatalog {
    detectors: Vec<Arc<dyn PhiDetector>>,
}

impl PatternCatalog {
    /// Build a catalog from detectors in registration order
    pub fn from_detectors(mut detectors: Vec<Arc<dyn PhiDetector>>) -> Self {
        // Stable sort keeps registration order within a priority
        detectors.sort_by_key(|d| d.priority());
        Self { detectors }
    }

    /// Compile a pattern library into a catalog
    pub fn from_library(library: &PatternLibrary) -> Result<Self> {
        let detectors = library
            .compile()?
            .into_iter()
            .map(|d| Arc::new(d) as Arc<dyn PhiDetector>)
            .collect();
        Ok(Self::from_detectors(detectors))
    }

    /// Load a catalog from a TOML pattern library file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_library(&PatternLibrary::from_file(path)?)
    }

    /// Built-in catalog
    pub fn builtin() -> Result<Self> {
        Self::from_library(&PatternLibrary::builtin()?)
    }

    /// Detectors in evaluation order
    pub fn detectors(&self) -> &[Arc<dyn PhiDetector>] {
        &self.detectors
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Raw candidates, ordered by detector priority then start offset
    pub fn detect(&self, text: &str) -> Vec<Candidate> {
        self.scan(text).candidates
    }

    /// Raw candidates plus scan warnings
    pub fn scan(&self, text: &str) -> DetectorScan {
        self.scan_where(text, |_| true)
    }

    /// Like [`scan`](Self::scan), running only the detectors `enabled` accepts
    pub fn scan_where<F>(&self, text: &str, enabled: F) -> DetectorScan
    where
        F: Fn(&dyn PhiDetector) -> bool,
    {
        let mut out = DetectorScan::default();
        if text.is_empty() {
            return out;
        }

        for detector in self.detectors.iter().filter(|d| enabled(d.as_ref())) {
            let scan = detector.scan(text);
            out.candidates.extend(scan.candidates);
            out.warnings.extend(scan.warnings);
        }

        out
    }
}

impl fmt::Debug for PatternCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.detectors.iter().map(|d| (d.name(), d.priority())))
            .finish()
    }
}
