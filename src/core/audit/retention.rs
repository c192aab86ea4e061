//! Periodic retention pruning

use super::log::AuditLog;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Run [`AuditLog::try_prune`] every `interval` until `shutdown` turns true
///
/// The first prune runs immediately. Missed ticks are skipped rather than
/// bunched, and an overlapping prune is skipped by `try_prune` itself.
pub fn spawn_retention_task(
    log: Arc<AuditLog>,
    retain_days: u32,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            retain_days,
            interval_secs = interval.as_secs(),
            "Audit retention task started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let log = Arc::clone(&log);
                    // Pruning takes the write lock; keep it off the async workers
                    let pruned = tokio::task::spawn_blocking(move || log.try_prune(retain_days)).await;
                    match pruned {
                        Ok(Some(removed)) => tracing::debug!(removed, "Retention prune finished"),
                        Ok(None) => {}
                        Err(e) => tracing::error!(error = %e, "Retention prune task failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Audit retention task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::entry::AuditEntry;
    use crate::core::audit::filter::AuditFilter;
    use chrono::{Duration as ChronoDuration, Utc};

    #[tokio::test]
    async fn test_task_prunes_and_stops() {
        let log = Arc::new(AuditLog::in_memory(10));
        log.append(AuditEntry::deletion("u", "x").at(Utc::now() - ChronoDuration::days(10)))
            .unwrap();
        log.append(AuditEntry::deletion("u", "y")).unwrap();

        let (tx, rx) = watch::channel(false);
        let handle = spawn_retention_task(Arc::clone(&log), 5, Duration::from_millis(20), rx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(log.query(&AuditFilter::all()).len(), 1);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("task should stop")
            .unwrap();
    }
}
