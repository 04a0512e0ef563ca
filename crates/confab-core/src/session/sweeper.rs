//! Idle-session sweeper — periodically evicts sessions nobody has touched
//! for longer than the configured TTL.
//!
//! Disabled unless `session.ttlSecs` is set; without it the store grows for
//! the lifetime of the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info};

use super::store::SessionStore;

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL_S: u64 = 60;

/// Background task that calls [`SessionStore::evict_idle`] on a fixed interval.
pub struct IdleSweeper {
    store: Arc<SessionStore>,
    ttl: Duration,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl IdleSweeper {
    pub fn new(store: Arc<SessionStore>, ttl: Duration, interval: Option<Duration>) -> Self {
        Self {
            store,
            ttl,
            interval: interval.unwrap_or(Duration::from_secs(DEFAULT_SWEEP_INTERVAL_S)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Run the sweep loop until [`IdleSweeper::stop`] is called.
    pub async fn start(&self) {
        info!(
            ttl_s = self.ttl.as_secs(),
            interval_s = self.interval.as_secs(),
            "idle session sweeper started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.sweep();
                }
                _ = self.shutdown.notified() => {
                    info!("idle session sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Stop the sweep loop. A stop issued before `start` is remembered.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }

    /// Run one eviction pass. Returns the number of sessions evicted.
    pub fn sweep(&self) -> usize {
        let evicted = self.store.evict_idle(self.ttl);
        if evicted > 0 {
            info!(evicted, remaining = self.store.len(), "evicted idle sessions");
        } else {
            debug!("sweep: no idle sessions");
        }
        evicted
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_evicts_expired() {
        let store = Arc::new(SessionStore::new());
        store.get_or_create("a");
        store.get_or_create("b");

        let sweeper = IdleSweeper::new(store.clone(), Duration::ZERO, None);
        assert_eq!(sweeper.sweep(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_keeps_fresh() {
        let store = Arc::new(SessionStore::new());
        store.get_or_create("a");

        let sweeper = IdleSweeper::new(store.clone(), Duration::from_secs(600), None);
        assert_eq!(sweeper.sweep(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_loop_sweeps_and_stops() {
        let store = Arc::new(SessionStore::new());
        store.get_or_create("stale");

        let sweeper = Arc::new(IdleSweeper::new(
            store.clone(),
            Duration::ZERO,
            Some(Duration::from_millis(10)),
        ));

        let svc = sweeper.clone();
        let handle = tokio::spawn(async move { svc.start().await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.stop();
        handle.await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_stop_before_start_exits() {
        let store = Arc::new(SessionStore::new());
        let sweeper = IdleSweeper::new(store, Duration::from_secs(1), None);
        sweeper.stop();
        sweeper.start().await;
    }
}
