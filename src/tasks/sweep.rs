//! Expired-entry Sweep Task
//!
//! Background task that periodically removes expired cache entries. Reads
//! already ignore expired entries; the sweep only reclaims memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically purges expired cache entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between sweeps.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::new());
/// let sweep_handle = spawn_sweep_task(store.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(store: Arc<CacheStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.purge_expired();

            if removed > 0 {
                info!(
                    "Cache sweep: removed {} expired entries ({} remaining)",
                    removed,
                    store.len()
                );
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
