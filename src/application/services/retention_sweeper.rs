//! Periodic removal of expired artifacts.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::artifact_cache::ArtifactCache;
use crate::application::dto::SweepReport;

/// Background task deleting artifacts older than the expiry.
pub struct RetentionSweeper {
    cache: Arc<ArtifactCache>,
    expiry: Duration,
    interval: Duration,
    batch: usize,
}

impl RetentionSweeper {
    /// Creates a sweeper. Nothing runs until [`Self::spawn`].
    #[must_use]
    pub const fn new(
        cache: Arc<ArtifactCache>,
        expiry: Duration,
        interval: Duration,
        batch: usize,
    ) -> Self {
        Self {
            cache,
            expiry,
            interval,
            batch,
        }
    }

    /// Runs one pass as if the current time were `now`.
    ///
    /// Failures are logged, never returned.
    pub async fn run_once(&self, now: SystemTime) -> SweepReport {
        let cutoff = now.checked_sub(self.expiry).unwrap_or(SystemTime::UNIX_EPOCH);
        match self.cache.sweep_expired(cutoff, self.batch).await {
            Ok(report) => {
                info!(
                    scanned = report.scanned,
                    removed = report.removed,
                    failed = report.failed,
                    "Retention sweep finished"
                );
                report
            }
            Err(e) => {
                warn!(
                    error = &e as &(dyn std::error::Error + 'static),
                    "Retention sweep could not list artifacts"
                );
                SweepReport::default()
            }
        }
    }

    /// Spawns the sweep loop. The first pass runs one interval after start.
    /// The loop ends when `shutdown` turns true or its sender is dropped.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            debug!(
                interval_secs = self.interval.as_secs(),
                expiry_secs = self.expiry.as_secs(),
                batch = self.batch,
                "Sweep loop running"
            );

            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once(SystemTime::now()).await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Image reaper stopped");
        })
    }
}
