//! Integration tests for the audit log, its JSONL journal and retention

use chrono::{Duration, Utc};
use phiguard::config::AuditConfig;
use phiguard::core::audit::{
    import_jsonl, read_jsonl_file, spawn_retention_task, AuditAction, AuditEntry, AuditFilter,
    AuditLog, AuditOutcome,
};
use phiguard::domain::AuditError;
use phiguard::phi::{RedactOptions, Redactor};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::tempdir;

fn journal_config(path: std::path::PathBuf, max_entries: usize) -> AuditConfig {
    AuditConfig {
        max_entries,
        log_path: Some(path),
        ..AuditConfig::default()
    }
}

#[test]
fn test_journal_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit").join("trail.jsonl");

    {
        let log = AuditLog::new(&journal_config(path.clone(), 100)).unwrap();
        log.append(AuditEntry::authentication("alice", true)).unwrap();
        log.append(AuditEntry::deletion("alice", "note-7")).unwrap();
    }
    {
        let log = AuditLog::new(&journal_config(path.clone(), 100)).unwrap();
        log.append(AuditEntry::authentication("bob", false)).unwrap();
    }

    let entries = read_jsonl_file(&path).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].user_id.as_deref(), Some("bob"));
    assert_eq!(entries[2].outcome, AuditOutcome::Failure);
}

#[test]
fn test_redaction_entries_never_store_plaintext() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trail.jsonl");
    let log = AuditLog::new(&journal_config(path.clone(), 100)).unwrap();

    let result = Redactor::builtin()
        .unwrap()
        .redact("Call John Smith at 555-123-4567", &RedactOptions::default());
    let entries: Vec<AuditEntry> = result.spans().iter().map(AuditEntry::redaction).collect();
    assert_eq!(log.append_batch(entries).unwrap(), 2);

    let journal = std::fs::read_to_string(&path).unwrap();
    assert!(!journal.contains("John Smith"));
    assert!(!journal.contains("555-123-4567"));
    assert!(journal.contains("sha256:"));
    assert!(journal.contains("[PHONE]"));
}

#[test]
fn test_export_import_round_trip_preserves_order() {
    let log = AuditLog::in_memory(100);
    let base = Utc::now() - Duration::hours(3);
    for i in 0..5 {
        log.append(AuditEntry::authentication(format!("user-{i}"), i % 2 == 0).at(base + Duration::minutes(i)))
            .unwrap();
    }

    let exported = log.export(&AuditFilter::all()).unwrap();
    let imported = import_jsonl(&exported).unwrap();

    assert_eq!(imported, log.query(&AuditFilter::all()));
    assert_eq!(imported[0].user_id.as_deref(), Some("user-4"));
}

#[test]
fn test_capacity_is_a_hard_bound() {
    let log = AuditLog::in_memory(5);
    for i in 0..12 {
        log.append(AuditEntry::deletion("admin", format!("n{i}"))).unwrap();
        assert!(log.len() <= 5);
    }

    let gaps = log.gaps();
    let evicted: usize = gaps.iter().map(|g| g.evicted).sum();
    assert_eq!(evicted, 7);
    assert_eq!(gaps.first().unwrap().first_sequence, 1);
    assert_eq!(gaps.last().unwrap().last_sequence, 7);

    let remaining: Vec<u64> = log
        .query(&AuditFilter::all())
        .iter()
        .map(|e| e.sequence)
        .collect();
    assert_eq!(remaining, vec![12, 11, 10, 9, 8]);
}

#[test]
fn test_batch_larger_than_capacity_is_rejected_whole() {
    let log = AuditLog::in_memory(3);
    log.append(AuditEntry::authentication("a", true)).unwrap();

    let batch: Vec<AuditEntry> = (0..4).map(|_| AuditEntry::authentication("b", true)).collect();
    assert!(matches!(
        log.append_batch(batch),
        Err(AuditError::StorageExhausted(_))
    ));
    assert_eq!(log.len(), 1);
}

#[test]
fn test_concurrent_appends_get_unique_sequences() {
    let log = Arc::new(AuditLog::in_memory(10_000));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let log = Arc::clone(&log);
            std::thread::spawn(move || {
                for i in 0..100 {
                    log.append(AuditEntry::authentication(format!("t{t}-{i}"), true))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let entries = log.query(&AuditFilter::all());
    assert_eq!(entries.len(), 800);
    let sequences: HashSet<u64> = entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences.len(), 800);
}

#[test]
fn test_filter_combinations() {
    let log = AuditLog::in_memory(100);
    log.append(AuditEntry::authentication("alice", false)).unwrap();
    log.append(AuditEntry::authentication("alice", true)).unwrap();
    log.append(AuditEntry::deletion("bob", "x")).unwrap();

    let failed_alice = log.query(
        &AuditFilter::all()
            .with_action(AuditAction::Authentication)
            .with_outcome(AuditOutcome::Failure)
            .with_user("alice"),
    );
    assert_eq!(failed_alice.len(), 1);

    let limited = log.query(&AuditFilter::all().with_limit(2));
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].action, AuditAction::Deletion);
}

#[test]
fn test_reloaded_trail_evicts_oldest_first() {
    let base = Utc::now() - Duration::days(1);
    let exported: Vec<AuditEntry> = (0..3)
        .rev()
        .map(|i| AuditEntry::deletion("admin", format!("n{i}")).at(base + Duration::minutes(i)))
        .collect();

    let log = AuditLog::from_entries(exported, 3);
    log.append(AuditEntry::deletion("admin", "n3")).unwrap();

    let details: Vec<String> = log
        .query(&AuditFilter::all())
        .into_iter()
        .filter_map(|e| e.details)
        .collect();
    assert_eq!(details, vec!["n3", "n2", "n1"]);
}

#[tokio::test]
async fn test_retention_task_prunes_old_entries() {
    let log = Arc::new(AuditLog::in_memory(100));
    log.append(AuditEntry::authentication("old", true).at(Utc::now() - Duration::days(400)))
        .unwrap();
    log.append(AuditEntry::authentication("new", true)).unwrap();

    let (tx, rx) = tokio::sync::watch::channel(false);
    let handle = spawn_retention_task(
        Arc::clone(&log),
        365,
        std::time::Duration::from_millis(10),
        rx,
    );

    tokio::time::sleep(std::time::Duration::from_millis(80)).await;
    tx.send(true).unwrap();
    handle.await.unwrap();

    let remaining = log.query(&AuditFilter::all());
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id.as_deref(), Some("new"));
}
