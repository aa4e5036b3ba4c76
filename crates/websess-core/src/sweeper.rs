//! Periodic expiry sweeps, driven from outside the store.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::traits::SessionStore;

/// Periodic driver that calls `collect_expired` on a fixed interval.
///
/// Stores never schedule their own sweeps; this task is the external
/// trigger. Dropping the sweeper aborts the task.
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn a sweep task evicting sessions idle longer than `max_lifetime`,
    /// once per `interval`.
    #[must_use]
    pub fn spawn(
        store: Arc<dyn SessionStore>,
        max_lifetime: Duration,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so sweeps start
            // one full interval after spawn.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = store.collect_expired(max_lifetime);
                if evicted > 0 {
                    debug!(evicted, live = store.len(), "expiry sweep finished");
                }
            }
        });
        Self { handle }
    }

    /// Stop sweeping.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::traits::{Session, StoreError};

    #[derive(Default)]
    struct CountingStore {
        sweeps: AtomicUsize,
    }

    impl SessionStore for CountingStore {
        fn create(&self, _sid: &str) -> Result<Arc<dyn Session>, StoreError> {
            Err(StoreError::Internal("not a real store".to_string()))
        }

        fn read(&self, _sid: &str) -> Result<Arc<dyn Session>, StoreError> {
            Err(StoreError::Internal("not a real store".to_string()))
        }

        fn get(&self, _sid: &str) -> Option<Arc<dyn Session>> {
            None
        }

        fn destroy(&self, _sid: &str) {}

        fn collect_expired(&self, _max_lifetime: Duration) -> usize {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            0
        }

        fn len(&self) -> usize {
            0
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_ticks_on_interval() {
        let store = Arc::new(CountingStore::default());
        let sweeper = Sweeper::spawn(
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Duration::from_secs(60),
            Duration::from_secs(1),
        );

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(store.sweeps.load(Ordering::SeqCst) >= 3);

        sweeper.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sweeper_stops_ticking() {
        let store = Arc::new(CountingStore::default());
        let sweeper = Sweeper::spawn(
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Duration::from_secs(60),
            Duration::from_secs(1),
        );

        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(sweeper);
        let after_drop = store.sweeps.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.sweeps.load(Ordering::SeqCst), after_drop);
    }
}
