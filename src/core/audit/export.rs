//! JSONL export, import and file sink
//!
//! One entry per line, fields in [`AuditEntry`] declaration order. This is the
//! regulatory handover format and the on-disk journal format.

use super::entry::AuditEntry;
use crate::domain::AuditError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Serialize entries as JSONL, one line per entry
pub fn to_jsonl<'a>(entries: impl IntoIterator<Item = &'a AuditEntry>) -> Result<String, AuditError> {
    let mut out = String::new();
    for entry in entries {
        let line = serde_json::to_string(entry)
            .map_err(|e| AuditError::Serialization(format!("Failed to serialize audit entry: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Parse JSONL produced by [`to_jsonl`]; blank lines are ignored
pub fn import_jsonl(text: &str) -> Result<Vec<AuditEntry>, AuditError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| {
                AuditError::Serialization(format!("Invalid audit record on line {}: {e}", idx + 1))
            })
        })
        .collect()
}

/// Read a JSONL audit file
pub fn read_jsonl_file<P: AsRef<Path>>(path: P) -> Result<Vec<AuditEntry>, AuditError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        AuditError::Storage(format!("Failed to read audit file {}: {e}", path.display()))
    })?;
    import_jsonl(&text)
}

/// Append-only JSONL journal
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    file: File,
}

impl JsonlSink {
    /// Open (creating if needed) the journal at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuditError::Storage(format!(
                    "Failed to create audit log directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                AuditError::Storage(format!("Failed to open audit log {}: {e}", path.display()))
            })?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a batch of entries in a single write and flush
    pub fn write_batch(&mut self, entries: &[AuditEntry]) -> Result<(), AuditError> {
        let buf = to_jsonl(entries)?;
        self.file
            .write_all(buf.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| {
                AuditError::Storage(format!(
                    "Failed to write audit log {}: {e}",
                    self.path.display()
                ))
            })
    }
}
