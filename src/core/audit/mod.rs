//! Audit log
//!
//! Append-only, bounded record of every redaction, suggestion and review
//! action. The log is an owned handle passed to producers; there is no global
//! instance.
//!
//! # Example
//!
//! ```
//! use phiguard::core::audit::{AuditEntry, AuditFilter, AuditLog};
//!
//! let log = AuditLog::in_memory(100);
//! log.append(AuditEntry::authentication("clinician-1", true))?;
//!
//! let recent = log.query(&AuditFilter::all().with_limit(10));
//! assert_eq!(recent.len(), 1);
//! # Ok::<(), phiguard::domain::AuditError>(())
//! ```

pub mod entry;
pub mod export;
pub mod filter;
pub mod log;
pub mod retention;

pub use entry::{AuditAction, AuditEntry, AuditOutcome, Severity, UserAction};
pub use export::{import_jsonl, read_jsonl_file, to_jsonl, JsonlSink};
pub use filter::AuditFilter;
pub use self::log::{AuditLog, EvictionGap};
pub use retention::spawn_retention_task;
