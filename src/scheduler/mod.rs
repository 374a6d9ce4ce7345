// region:    --- Imports
use crate::closer::AuctionCloser;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::error;

// endregion: --- Imports

// region:    --- Closer Scheduler

/// Periodic in-process trigger for the auction closer. Deployments that run
/// the closer from cron use the `close-auctions` binary argument instead.
pub struct CloserScheduler {
    closer: Arc<AuctionCloser>,
    period: Duration,
}

impl CloserScheduler {
    pub fn new(closer: Arc<AuctionCloser>, period_secs: u64) -> Self {
        Self {
            closer,
            period: Duration::from_secs(period_secs),
        }
    }

    /// Spawn the periodic loop. A failed pass is logged and the loop keeps
    /// going; individual item failures are already isolated inside the closer.
    pub fn start(&self) {
        let closer = Arc::clone(&self.closer);
        let period = self.period;
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = closer.process_ended_auctions(Utc::now()).await {
                    error!("{:<12} --> closer pass failed: {:?}", "Scheduler", e);
                }
            }
        });
    }
}

// endregion: --- Closer Scheduler
