//! Debounced snapshot recompute scheduler
//!
//! Generation success only *schedules* a recompute of the product group's
//! cached availability snapshot. Notifications for the same group within
//! the debounce window coalesce into one recompute, so a burst of
//! generation requests costs one snapshot rebuild.

use super::SnapshotScheduler;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// The downstream side of the snapshot contract.
#[async_trait]
pub trait SnapshotTarget: Send + Sync {
    async fn recompute(&self, product_group: &str);
}

/// Per-group debouncing scheduler backed by a worker task.
#[derive(Clone)]
pub struct DebouncedSnapshotScheduler {
    tx: mpsc::UnboundedSender<String>,
}

impl DebouncedSnapshotScheduler {
    /// Spawn the worker. Dropping every scheduler handle stops the worker
    /// after it flushes whatever is still pending.
    pub fn spawn(target: Arc<dyn SnapshotTarget>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(worker(rx, target, debounce));
        Self { tx }
    }
}

impl SnapshotScheduler for DebouncedSnapshotScheduler {
    fn schedule_recompute(&self, product_group: &str) {
        // Send failure means the worker is gone; nothing to do but log
        if self.tx.send(product_group.to_string()).is_err() {
            tracing::warn!(
                product_group,
                "snapshot scheduler worker stopped, notification dropped"
            );
        }
    }
}

async fn worker(
    mut rx: mpsc::UnboundedReceiver<String>,
    target: Arc<dyn SnapshotTarget>,
    debounce: Duration,
) {
    let mut deadlines: HashMap<String, Instant> = HashMap::new();

    loop {
        let next_deadline = deadlines.values().min().copied();
        tokio::select! {
            msg = rx.recv() => match msg {
                // A repeat notification pushes the group's deadline out,
                // coalescing the burst into one recompute
                Some(group) => {
                    deadlines.insert(group, Instant::now() + debounce);
                }
                None => break,
            },
            _ = sleep_until_opt(next_deadline) => {
                let now = Instant::now();
                let due: Vec<String> = deadlines
                    .iter()
                    .filter(|(_, deadline)| **deadline <= now)
                    .map(|(group, _)| group.clone())
                    .collect();
                for group in due {
                    deadlines.remove(&group);
                    tracing::debug!(product_group = %group, "snapshot recompute fired");
                    target.recompute(&group).await;
                }
            }
        }
    }

    // Channel closed: flush anything still pending
    for group in deadlines.into_keys() {
        target.recompute(&group).await;
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
