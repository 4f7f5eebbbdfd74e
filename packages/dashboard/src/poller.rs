//! Periodic snapshot refresh

use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::SharedDashboard;

pub struct Poller {
    dashboard: SharedDashboard,
    interval: Duration,
}

impl Poller {
    pub fn new(dashboard: SharedDashboard, interval: Duration) -> Self {
        Self { dashboard, interval }
    }

    /// Refresh on every tick until shutdown
    pub async fn run(&self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        info!(interval_secs = self.interval.as_secs(), "Poller starting...");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    debug!("Refreshing account snapshot");
                    if let Err(e) = self.dashboard.refresh().await {
                        warn!(error = %e, "Error refreshing snapshot");
                    }
                }
            }
        }

        Ok(())
    }
}
