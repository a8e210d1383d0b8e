//! Background reclamation of expired entries.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::TtlCache;

/// Sweep interval used by the deployed gateway.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

impl<V> TtlCache<V>
where
    V: Send + Sync + 'static,
{
    /// Spawns the periodic sweep task for this cache.
    ///
    /// Every `interval` the task calls [`purge_expired`](Self::purge_expired)
    /// once. The task performs no I/O and cannot fail; it runs until the
    /// returned [`SweeperHandle`] is shut down or dropped, or until the cache
    /// itself is dropped (the task only holds a weak reference).
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let cache: Weak<Self> = Arc::downgrade(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // Consume the immediate first tick so the first sweep happens one
            // full interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(cache) = cache.upgrade() else { break };
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            debug!(removed, "swept expired cache entries");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        SweeperHandle { shutdown_tx, task }
    }
}

/// Owner handle for a cache's sweep task.
///
/// Dropping the handle closes the shutdown channel, which stops the task; use
/// [`shutdown`](Self::shutdown) to stop it and wait for it to exit, which
/// tests rely on for deterministic start/stop.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweep task to stop and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }

    /// Returns true if the sweep task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_reclaims_expired_entries() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        let handle = cache.spawn_sweeper(DEFAULT_SWEEP_INTERVAL);

        cache.set("short", 1, Duration::from_secs(30));
        cache.set("forever", 2, Duration::ZERO);
        assert_eq!(cache.len(), 2);

        // Let one sweep interval elapse; the expired entry is physically
        // removed, the immortal one survives.
        tokio::time::sleep(DEFAULT_SWEEP_INTERVAL + Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("forever"), Some(2));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_does_not_change_get_outcomes() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        let handle = cache.spawn_sweeper(DEFAULT_SWEEP_INTERVAL);

        cache.set("k", 1, Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(31)).await;

        // Already invisible before the sweep runs...
        assert_eq!(cache.get("k"), None);

        tokio::time::sleep(DEFAULT_SWEEP_INTERVAL).await;
        tokio::task::yield_now().await;

        // ...and still invisible after, never "found" again.
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_reclamation() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        let handle = cache.spawn_sweeper(Duration::from_secs(60));

        handle.shutdown().await;

        cache.set("k", 1, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(120)).await;
        tokio::task::yield_now().await;

        // No sweep ran: the expired entry is still physically present.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_exits_when_cache_is_dropped() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        let handle = cache.spawn_sweeper(Duration::from_secs(60));

        drop(cache);
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(handle.is_finished());
    }
}
