//! Invalidation Sweeper Task
//!
//! Background task that periodically evicts expired cache entries so storage
//! is freed even for data types nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheService;

/// Spawns the sweeper.
///
/// The first sweep runs immediately; later sweeps run every `interval`.
/// Freshness is unaffected, since `load` already refuses expired entries.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweeper_task(cache.clone(), Duration::from_secs(600));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweeper_task(cache: Arc<CacheService>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "Starting cache sweeper"
        );

        loop {
            let evicted = cache.clean_expired_cache();
            if evicted == 0 {
                debug!("Cache sweep: no expired entries found");
            }

            tokio::time::sleep(interval).await;
        }
    })
}
