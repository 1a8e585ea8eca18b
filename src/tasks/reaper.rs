//! Expired-Entry Reaper
//!
//! Background task that periodically removes expired cache entries and
//! fires the eviction callback for each removed pair.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{EvictionCallback, Store, Value};

/// Spawns a background task that periodically sweeps expired entries.
///
/// Each tick acquires the write lock once, removes every past-due entry,
/// and releases the lock before any notification fires, so eviction
/// callbacks may safely call back into the cache.
///
/// The returned handle is aborted by the owning cache on shutdown or when
/// its last clone is dropped; the task never outlives the cache.
pub(crate) fn spawn_reaper(store: Arc<RwLock<Store>>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("starting reaper with a {:?} sweep interval", every);

        let mut ticker = tokio::time::interval(every);
        // An interval fires immediately; the first sweep should wait a full period.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            // Sweep under the write lock, notify after releasing it.
            let (removed, notify, callback) = {
                let mut store = store.write().await;
                let (removed, notify) = store.sweep_expired();
                (removed, notify, store.eviction_callback())
            };

            if removed > 0 {
                debug!("reaper removed {} expired entries", removed);
            }

            if let Some(callback) = callback {
                for (key, value) in notify {
                    notify_evicted(&callback, &key, value);
                }
            }
        }
    })
}

/// Invokes the eviction callback for one removed pair.
///
/// A panicking callback is contained and logged so the remaining
/// notifications of the same sweep still fire.
pub(crate) fn notify_evicted(callback: &EvictionCallback, key: &str, value: Value) {
    if catch_unwind(AssertUnwindSafe(|| callback(key, value))).is_err() {
        warn!(key, "eviction callback panicked");
    }
}
