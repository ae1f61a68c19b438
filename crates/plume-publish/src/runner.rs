//! Fixed-interval sweep loop.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

use plume_store::Store;

use crate::SweepCoordinator;

/// Default seconds between sweep ticks.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Runs the sweep on a fixed interval until told to shut down.
pub struct SweepRunner<S> {
    coordinator: SweepCoordinator<S>,
    interval: Duration,
}

impl<S: Store + 'static> SweepRunner<S> {
    pub fn new(coordinator: SweepCoordinator<S>) -> Self {
        Self {
            coordinator,
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the shutdown channel flips to `true`.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "sweep runner starting");

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let stats = self.coordinator.tick().await;
            if stats.attempted > 0 {
                info!(
                    attempted = stats.attempted,
                    succeeded = stats.succeeded,
                    failed = stats.failed,
                    "sweep tick complete"
                );
            } else {
                debug!("sweep tick idle");
            }

            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("sweep runner received shutdown signal");
                    }
                }
                _ = sleep(self.interval) => {}
            }
        }

        info!("sweep runner shut down");
    }
}
