//! Scheduled cleanup of expired cache rows.

use crate::db::Database;
use crate::error::Result;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default cleanup interval (daily).
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(86_400);

/// Periodic purge of expired, non-favorited cache rows.
///
/// Favorited rows are never eligible. A failed cycle is logged and retried
/// on the next tick; cache growth from a missed cycle corrects itself.
pub struct Reaper {
    db: Database,
    interval: Duration,
}

impl Reaper {
    /// Create a reaper over the shared store.
    pub fn new(db: Database, interval: Duration) -> Self {
        Self { db, interval }
    }

    /// Run one purge cycle, returning the number of rows removed.
    pub fn run_once(&self) -> Result<usize> {
        self.db.delete_expired_non_favorites()
    }

    /// Spawn the recurring purge task. The first immediate tick is
    /// skipped so startup never races a fresh cache fill.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await; // Skip first immediate tick

            loop {
                ticker.tick().await;

                match self.run_once() {
                    Ok(0) => tracing::debug!("No expired cache entries"),
                    Ok(removed) => tracing::info!(removed = removed, "Purged expired cache entries"),
                    Err(e) => tracing::warn!(error = %e, "Cache cleanup failed, will retry next cycle"),
                }
            }
        })
    }
}
