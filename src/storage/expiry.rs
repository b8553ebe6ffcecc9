//! Background Expiry Sweeper
//!
//! A [`Store`](crate::storage::Store) only drops expired entries when they are
//! touched or when an enumeration or snapshot sweeps the whole map. A store
//! that is written to but rarely enumerated can therefore hold on to expired
//! entries indefinitely.
//!
//! Embedders that share a store through a [`SharedStore`] can start an
//! [`ExpirySweeper`]: a Tokio task that periodically takes the lock and runs a
//! full sweep. The interval shrinks while sweeps keep finding expired keys and
//! grows back when they find none (see [`SweepConfig`]).

use crate::config::SweepConfig;
use crate::storage::SharedStore;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct ExpirySweeper {
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    /// Starts the sweeper as a background task on the current Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use stashkv::{ExpirySweeper, Store, SweepConfig};
    ///
    /// let shared = Store::named("cache").into_shared();
    /// let sweeper = ExpirySweeper::start(shared.clone(), SweepConfig::default());
    ///
    /// // Dropping the sweeper stops it
    /// drop(sweeper);
    /// ```
    pub fn start(store: SharedStore, config: SweepConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(store, config, shutdown_rx));

        info!("Background expiry sweeper started");

        Self { shutdown_tx }
    }

    /// Stops the sweeper. Called automatically on drop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        info!("Background expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweeper_loop(
    store: SharedStore,
    config: SweepConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut current_interval = config.base_interval;

    loop {
        // Shutdown wins over a timer that fired at the same time
        tokio::select! {
            biased;
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
            _ = tokio::time::sleep(current_interval) => {}
        }

        let removed = match store.lock() {
            Ok(mut guard) => guard.sweep_expired(),
            Err(_) => {
                warn!("Store lock poisoned, stopping expiry sweeper");
                return;
            }
        };

        current_interval = config.next_interval(current_interval, removed);
        trace!(
            removed,
            next_interval_ms = current_interval.as_millis() as u64,
            "Sweep finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::storage::{ManualClock, Store, NO_EXPIRY};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_config() -> SweepConfig {
        SweepConfig {
            base_interval: Duration::from_millis(10),
            min_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
        }
    }

    fn shared_at(clock: &ManualClock) -> SharedStore {
        Store::with_clock(StoreConfig::default(), Arc::new(clock.clone())).into_shared()
    }

    fn raw_len(store: &SharedStore) -> usize {
        // len() would sweep on its own
        store.lock().unwrap().stored_len()
    }

    #[tokio::test]
    async fn test_sweeper_cleans_expired_keys() {
        let clock = ManualClock::new(1_000);
        let store = shared_at(&clock);

        {
            let mut guard = store.lock().unwrap();
            for i in 0..10 {
                guard.set(&format!("key{i}"), json!("value"), 5).unwrap();
            }
            guard.set("persistent", json!("value"), NO_EXPIRY).unwrap();
        }
        assert_eq!(raw_len(&store), 11);

        let _sweeper = ExpirySweeper::start(Arc::clone(&store), fast_config());

        clock.advance(5);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(raw_len(&store), 1);
        assert!(store.lock().unwrap().exists("persistent"));
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_drop() {
        let clock = ManualClock::new(1_000);
        let store = shared_at(&clock);

        {
            let _sweeper = ExpirySweeper::start(Arc::clone(&store), fast_config());
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        store.lock().unwrap().set("key", json!(1), 1).unwrap();
        clock.advance(1);
        tokio::time::sleep(Duration::from_millis(60)).await;

        // Nothing swept it, but a read still never observes it
        assert_eq!(raw_len(&store), 1);
        assert_eq!(store.lock().unwrap().get("key").unwrap(), None);
    }
}
