//! Cache Handle Module
//!
//! The public, cloneable cache handle: one store behind a reader/writer
//! lock, an optional background reaper, and the in-flight computation
//! registry backing memoize.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::group::{Group, Role};
use crate::cache::{Entry, StatsSnapshot, Store, Ttl, Value};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{notify_evicted, spawn_reaper};

// == Cache ==
/// A concurrency-safe in-memory cache with TTL expiration, compound
/// values, and memoized computation.
///
/// Cloning is cheap; every clone operates on the same underlying store.
/// Read operations take the shared side of one reader/writer lock and
/// mutations the exclusive side. No user-supplied code (eviction callbacks,
/// memoized computations) ever runs while either side is held.
#[derive(Clone)]
pub struct Cache {
    inner: Arc<Shared>,
}

struct Shared {
    store: Arc<RwLock<Store>>,
    group: Group,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        // Deterministic teardown: the reaper dies with the last handle.
        if let Some(handle) = self.reaper.lock().take() {
            handle.abort();
        }
    }
}

impl Cache {
    // == Constructor ==
    /// Creates a new cache.
    ///
    /// If `config.cleanup_interval` is set, a background sweep task is
    /// spawned on the current tokio runtime; construction must then happen
    /// inside one. Without a cleanup interval no task exists: expired
    /// entries stay hidden from reads but are only reclaimed when a later
    /// write replaces them.
    pub fn new(config: Config) -> Self {
        let store = Arc::new(RwLock::new(Store::new(config.default_expiration)));
        let reaper = config
            .cleanup_interval
            .map(|every| spawn_reaper(Arc::clone(&store), every));

        Self {
            inner: Arc::new(Shared {
                store,
                group: Group::new(),
                reaper: Mutex::new(reaper),
            }),
        }
    }

    // == Set ==
    /// Upserts a value. Overwriting is silent and never fires the eviction
    /// callback.
    pub async fn set(&self, key: &str, value: impl Into<Value>, ttl: Ttl) {
        self.inner
            .store
            .write()
            .await
            .set(key.to_string(), value.into(), ttl);
    }

    // == Get ==
    /// Retrieves a value; `None` if absent or expired.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.store.read().await.get(key)
    }

    // == Delete ==
    /// Removes an entry, returning whether one was present.
    ///
    /// The eviction callback, if registered, is invoked with the removed
    /// pair after the lock is released, so it may re-enter the cache.
    pub async fn delete(&self, key: &str) -> bool {
        let (removed, callback) = {
            let mut store = self.inner.store.write().await;
            let removed = store.delete(key);
            let callback = removed.as_ref().and(store.eviction_callback());
            (removed, callback)
        };

        match removed {
            Some(value) => {
                if let Some(callback) = callback {
                    notify_evicted(&callback, key, value);
                }
                true
            }
            None => false,
        }
    }

    // == Set Expiration ==
    /// Updates only the expiration of an existing entry; no-op if absent.
    pub async fn set_expiration(&self, key: &str, ttl: Ttl) {
        self.inner.store.write().await.set_expiration(key, ttl);
    }

    // == Increment / Decrement ==
    /// Adds `n` to a numeric entry, returning the updated value.
    pub async fn increment(&self, key: &str, n: i64) -> Result<Value> {
        self.inner.store.write().await.increment(key, n)
    }

    /// Subtracts `n` from a numeric entry, returning the updated value.
    pub async fn decrement(&self, key: &str, n: i64) -> Result<Value> {
        self.inner.store.write().await.decrement(key, n)
    }

    // == Hash Operations ==
    /// Writes one field of the mapping under `key`; see [`Store::hset`].
    pub async fn hset(&self, key: &str, field: &str, value: impl Into<Value>) {
        self.inner.store.write().await.hset(key, field, value.into());
    }

    /// Reads one field of the mapping under `key`.
    pub async fn hget(&self, key: &str, field: &str) -> Option<Value> {
        self.inner.store.read().await.hget(key, field)
    }

    /// Returns a copy of the whole mapping under `key`.
    pub async fn hget_all(&self, key: &str) -> Option<HashMap<String, Value>> {
        self.inner.store.read().await.hget_all(key)
    }

    /// Removes one field of the mapping under `key`.
    pub async fn hdel(&self, key: &str, field: &str) {
        self.inner.store.write().await.hdel(key, field);
    }

    // == List Operations ==
    /// Appends at the back end of the sequence under `key`; see
    /// [`Store::lpush`].
    pub async fn lpush(&self, key: &str, value: impl Into<Value>) {
        self.inner.store.write().await.lpush(key, value.into());
    }

    /// Appends at the front end of the sequence under `key`.
    pub async fn rpush(&self, key: &str, value: impl Into<Value>) {
        self.inner.store.write().await.rpush(key, value.into());
    }

    /// Removes and returns the back element of the sequence under `key`.
    pub async fn lpop(&self, key: &str) -> Option<Value> {
        self.inner.store.write().await.lpop(key)
    }

    /// Removes and returns the front element of the sequence under `key`.
    pub async fn rpop(&self, key: &str) -> Option<Value> {
        self.inner.store.write().await.rpop(key)
    }

    // == Bulk Operations ==
    /// Returns a consistent point-in-time copy of all non-expired entries.
    pub async fn items(&self) -> HashMap<String, Entry> {
        self.inner.store.read().await.items()
    }

    /// Returns the raw entry count, including expired-but-unswept entries.
    pub async fn item_count(&self) -> usize {
        self.inner.store.read().await.item_count()
    }

    /// Clears all entries without firing eviction callbacks.
    pub async fn flush(&self) {
        self.inner.store.write().await.flush();
    }

    // == Eviction Callback ==
    /// Registers (or replaces) the eviction callback.
    ///
    /// Fires on explicit delete and on reaper sweep only, never on
    /// overwrite or flush.
    pub async fn on_evicted<F>(&self, callback: F)
    where
        F: Fn(&str, Value) + Send + Sync + 'static,
    {
        self.inner
            .store
            .write()
            .await
            .set_eviction_callback(Some(Arc::new(callback)));
    }

    /// Disables the eviction callback.
    pub async fn clear_eviction_callback(&self) {
        self.inner.store.write().await.set_eviction_callback(None);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.store.read().await.stats()
    }

    // == Memoize ==
    /// Returns the cached value for `key`, computing and caching it on a
    /// miss with at most one concurrent computation per key.
    ///
    /// On a hit `compute` is never invoked. On a miss the first caller
    /// runs `compute` while any concurrent callers for the same key block
    /// and then share the same outcome. A successful result is written to
    /// the cache with `ttl` before the waiters are released; a failure is
    /// delivered to every caller as [`CacheError::Compute`] and nothing is
    /// cached, so a later call computes afresh.
    ///
    /// The store lock is held only for the initial check and the final
    /// write, never across `compute`, so a slow computation delays only
    /// its own key.
    pub async fn memoize<F, Fut>(&self, key: &str, ttl: Ttl, compute: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        match self.inner.group.join(key) {
            Role::Leader(flight) => {
                // The check and the registration are not one critical
                // section: a flight that settled in between may already
                // have populated the key.
                if let Some(value) = self.get(key).await {
                    flight.settle(Ok(value.clone()));
                    return Ok(value);
                }

                let outcome = match compute().await {
                    Ok(value) => {
                        self.set(key, value.clone(), ttl).await;
                        Ok(value)
                    }
                    Err(err) => Err(CacheError::Compute(Arc::new(err))),
                };
                flight.settle(outcome.clone());
                outcome
            }
            Role::Waiter(rx) => match Group::wait(rx).await {
                Some(outcome) => outcome,
                // The leader was cancelled before settling; start over.
                None => Box::pin(self.memoize(key, ttl, compute)).await,
            },
        }
    }

    // == Shutdown ==
    /// Stops the background sweep, if one is running.
    ///
    /// Entries already stored remain readable; expired ones are thereafter
    /// only hidden lazily. Dropping the last clone of the cache has the
    /// same effect.
    pub fn shutdown(&self) {
        if let Some(handle) = self.inner.reaper.lock().take() {
            handle.abort();
            debug!("reaper stopped");
        }
    }
}
