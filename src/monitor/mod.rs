use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::registry::StatusStore;
use crate::types::LivenessState;

/// Periodic staleness sweep: any agent still marked online whose last
/// report is older than the threshold is flipped offline. Only ingestion
/// ever advances last-seen times or brings an agent back online.
pub struct LivenessMonitor<S: StatusStore> {
    store: Arc<S>,
    offline_threshold_secs: u64,
    sweep_interval: Duration,
}

impl<S: StatusStore> LivenessMonitor<S> {
    pub fn new(store: Arc<S>, offline_threshold_secs: u64, sweep_interval: Duration) -> Self {
        Self {
            store,
            offline_threshold_secs,
            sweep_interval,
        }
    }

    /// One pass over the registry. Decisions are made on a point-in-time
    /// copy so the registry lock is never held across the scan. Returns
    /// the number of agents transitioned.
    pub fn sweep(&self) -> Result<usize> {
        let now = Utc::now();
        let records = self.store.get_all()?;

        let mut transitioned = 0;
        for record in records {
            if record.liveness != LivenessState::Online {
                continue;
            }
            let elapsed = record.seconds_since_seen(now);
            // strict greater-than: a report landing exactly at the
            // threshold boundary keeps the agent online
            if elapsed > self.offline_threshold_secs as i64 {
                self.store.update_status(&record.id, LivenessState::Offline)?;
                log::info!(
                    "agent {} ({}) marked offline, no report for {}s",
                    record.id,
                    record.snapshot.hostname,
                    elapsed
                );
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }

    /// Recurring sweep task. Runs until the stop signal flips to true;
    /// sweep errors are logged and the cadence continues.
    pub async fn run(&self, mut stop_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.sweep_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep() {
                        log::error!("liveness sweep failed: {}", err);
                    }
                }
                _ = stop_rx.changed() => {
                    if *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
