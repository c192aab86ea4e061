//! Bounded, append-only audit log

use super::entry::AuditEntry;
use super::export::{to_jsonl, JsonlSink};
use super::filter::AuditFilter;
use crate::config::AuditConfig;
use crate::domain::AuditError;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

/// Maximum number of eviction gaps remembered
pub const MAX_GAP_RECORDS: usize = 1024;

/// Prefix of hashed originals
pub const HASH_PREFIX: &str = "sha256:";

/// Meta-event recorded when capacity forces the oldest entries out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvictionGap {
    /// When the eviction happened
    pub recorded_at: DateTime<Utc>,
    /// Number of entries evicted
    pub evicted: usize,
    /// Earliest timestamp among evicted entries
    pub oldest_evicted: DateTime<Utc>,
    /// Latest timestamp among evicted entries
    pub newest_evicted: DateTime<Utc>,
    /// Sequence range of evicted entries
    pub first_sequence: u64,
    pub last_sequence: u64,
}

impl EvictionGap {
    /// Whether evicted entries fell inside `[start, end)`
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.oldest_evicted < end && self.newest_evicted >= start
    }
}

#[derive(Debug, Default)]
struct AuditState {
    entries: VecDeque<AuditEntry>,
    gaps: VecDeque<EvictionGap>,
    next_sequence: u64,
    sink: Option<JsonlSink>,
}

/// Owned, shareable audit log
///
/// Share it between producers with `Arc<AuditLog>`. Writers (`append`,
/// `append_batch`, `prune`) serialize on a write lock; readers clone a
/// consistent snapshot under a read lock and never observe a partial write.
#[derive(Debug)]
pub struct AuditLog {
    state: RwLock<AuditState>,
    max_entries: usize,
    hash_originals: bool,
    pruning: AtomicBool,
}

impl AuditLog {
    /// Create a log from configuration, opening the JSONL sink if configured
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let sink = config.log_path.as_ref().map(JsonlSink::open).transpose()?;
        if let Some(sink) = &sink {
            tracing::info!(path = %sink.path().display(), "Audit journal opened");
        }

        Ok(Self {
            state: RwLock::new(AuditState {
                sink,
                next_sequence: 1,
                ..AuditState::default()
            }),
            max_entries: config.max_entries.max(2),
            hash_originals: config.hash_originals,
            pruning: AtomicBool::new(false),
        })
    }

    /// In-memory log with the given capacity
    pub fn in_memory(max_entries: usize) -> Self {
        Self {
            state: RwLock::new(AuditState {
                next_sequence: 1,
                ..AuditState::default()
            }),
            max_entries: max_entries.max(2),
            hash_originals: true,
            pruning: AtomicBool::new(false),
        }
    }

    /// Keep original text instead of hashing it
    pub fn with_hash_originals(mut self, hash_originals: bool) -> Self {
        self.hash_originals = hash_originals;
        self
    }

    /// Rebuild an in-memory log from exported entries
    ///
    /// Ids, timestamps and sequences are kept. Capacity grows to fit the
    /// entries if needed. Entries are stored oldest first whatever the input
    /// order, so later evictions still drop the oldest.
    pub fn from_entries(mut entries: Vec<AuditEntry>, max_entries: usize) -> Self {
        entries.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        let next_sequence = entries.iter().map(|e| e.sequence).max().unwrap_or(0) + 1;
        let capacity = max_entries.max(entries.len()).max(2);

        Self {
            state: RwLock::new(AuditState {
                entries: entries.into(),
                next_sequence,
                ..AuditState::default()
            }),
            max_entries: capacity,
            hash_originals: true,
            pruning: AtomicBool::new(false),
        }
    }

    /// Capacity
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Append one entry, returning its sequence number
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the journal write fails; nothing is
    /// stored in that case.
    pub fn append(&self, entry: AuditEntry) -> Result<u64, AuditError> {
        let mut sequences = self.append_all(vec![entry])?;
        sequences
            .pop()
            .ok_or_else(|| AuditError::Storage("append produced no sequence".to_string()))
    }

    /// Append entries atomically: either all are stored or none are
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::StorageExhausted`] if the batch alone exceeds the
    /// capacity, or [`AuditError::Storage`] if the journal write fails.
    pub fn append_batch(&self, entries: Vec<AuditEntry>) -> Result<usize, AuditError> {
        self.append_all(entries).map(|seqs| seqs.len())
    }

    fn append_all(&self, mut entries: Vec<AuditEntry>) -> Result<Vec<u64>, AuditError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        if entries.len() > self.max_entries {
            return Err(AuditError::StorageExhausted(format!(
                "batch of {} entries exceeds capacity of {}",
                entries.len(),
                self.max_entries
            )));
        }

        let mut state = self.state.write();

        let first = state.next_sequence;
        for (offset, entry) in entries.iter_mut().enumerate() {
            entry.sequence = first + offset as u64;
            if self.hash_originals {
                hash_original(entry);
            }
        }

        // Journal first: a failed write leaves memory untouched
        if let Some(sink) = state.sink.as_mut() {
            sink.write_batch(&entries)?;
        }

        let incoming = entries.len();
        let overflow = (state.entries.len() + incoming).saturating_sub(self.max_entries);
        if overflow > 0 {
            let evicted: Vec<AuditEntry> = state.entries.drain(..overflow).collect();
            let gap = eviction_gap(&evicted);
            crate::log_audit_eviction!(gap.evicted, gap.first_sequence, gap.last_sequence);

            if state.gaps.len() == MAX_GAP_RECORDS {
                state.gaps.pop_front();
            }
            state.gaps.push_back(gap);
        }

        let sequences = entries.iter().map(|e| e.sequence).collect();
        state.next_sequence = first + incoming as u64;
        state.entries.extend(entries);

        Ok(sequences)
    }

    /// Entries matching `filter`, most recent first
    ///
    /// Ties on timestamp are broken by append sequence, later first.
    pub fn query(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        let mut matched: Vec<AuditEntry> = {
            let state = self.state.read();
            state
                .entries
                .iter()
                .filter(|e| filter.matches(e))
                .cloned()
                .collect()
        };

        matched.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        matched
    }

    /// Eviction gaps, oldest first
    pub fn gaps(&self) -> Vec<EvictionGap> {
        self.state.read().gaps.iter().cloned().collect()
    }

    /// Export matching entries as JSONL, most recent first
    pub fn export(&self, filter: &AuditFilter) -> Result<String, AuditError> {
        to_jsonl(&self.query(filter))
    }

    /// Remove entries older than `retain_days`
    pub fn prune(&self, retain_days: u32) -> usize {
        self.prune_before(Utc::now() - Duration::days(i64::from(retain_days)))
    }

    /// Remove entries with a timestamp before `cutoff`, returning the count
    ///
    /// Idempotent: a second call with the same cutoff removes nothing.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut state = self.state.write();

        let before = state.entries.len();
        state.entries.retain(|e| e.timestamp >= cutoff);
        state.gaps.retain(|g| g.newest_evicted >= cutoff);
        let removed = before - state.entries.len();

        if removed > 0 {
            tracing::info!(removed, cutoff = %cutoff.to_rfc3339(), "Pruned audit entries");
        }
        removed
    }

    /// Prune unless another prune is already running
    ///
    /// Returns `None` when skipped.
    pub fn try_prune(&self, retain_days: u32) -> Option<usize> {
        if self
            .pruning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Prune already in progress, skipping");
            return None;
        }

        let _guard = PruneGuard(&self.pruning);
        Some(self.prune(retain_days))
    }
}

struct PruneGuard<'a>(&'a AtomicBool);

impl Drop for PruneGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn hash_original(entry: &mut AuditEntry) {
    if entry.original.is_empty() || entry.original.starts_with(HASH_PREFIX) {
        return;
    }
    let digest = Sha256::digest(entry.original.as_bytes());
    entry.original = format!("{HASH_PREFIX}{digest:x}");
}

fn eviction_gap(evicted: &[AuditEntry]) -> EvictionGap {
    let now = Utc::now();
    let oldest = evicted.iter().map(|e| e.timestamp).min().unwrap_or(now);
    let newest = evicted.iter().map(|e| e.timestamp).max().unwrap_or(now);

    EvictionGap {
        recorded_at: now,
        evicted: evicted.len(),
        oldest_evicted: oldest,
        newest_evicted: newest,
        first_sequence: evicted.first().map(|e| e.sequence).unwrap_or(0),
        last_sequence: evicted.last().map(|e| e.sequence).unwrap_or(0),
    }
}
