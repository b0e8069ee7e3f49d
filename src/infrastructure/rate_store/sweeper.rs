//! Background task that evicts expired rate records.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::repositories::RateStore;

/// Owner of a running sweeper task.
///
/// Dropping the handle without calling [`SweeperHandle::stop`] closes the
/// shutdown channel, which also ends the task.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Rate store sweeper task failed: {}", e);
        }
    }
}

/// Spawns a sweeper that calls [`RateStore::sweep`] every `period`.
///
/// The first sweep runs immediately.
pub fn spawn_sweeper(store: Arc<dyn RateStore>, period: Duration) -> SweeperHandle {
    let (shutdown, rx) = watch::channel(false);
    let task = tokio::spawn(run_sweeper(store, period, rx));
    SweeperHandle { shutdown, task }
}

/// Sweep loop; returns once `shutdown` turns true or its sender is dropped.
pub async fn run_sweeper(
    store: Arc<dyn RateStore>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_secs = period.as_secs(), "Rate store sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match store.sweep(Instant::now()).await {
                    Ok(0) => {}
                    Ok(removed) => {
                        debug!(removed, "Swept expired rate records");
                        metrics::counter!("campus_gate_swept_records_total")
                            .increment(removed as u64);
                    }
                    Err(e) => warn!("Rate store sweep failed: {}", e),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Rate store sweeper stopped");
}
