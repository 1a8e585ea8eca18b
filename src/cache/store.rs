//! Cache Store Module
//!
//! Core cache engine: a single key space of entries with lazy TTL expiration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheStats, Entry, StatsSnapshot, Ttl, Value};
use crate::error::{CacheError, Result};

// == Eviction Callback ==
/// Hook invoked with `(key, value)` when an entry is removed by an explicit
/// delete or by the background sweep.
///
/// Never fired for overwrites or flushes, and always invoked after the
/// store lock has been released so the callback may re-enter the cache.
pub type EvictionCallback = Arc<dyn Fn(&str, Value) + Send + Sync>;

// == Cache Store ==
/// Main cache storage with TTL expiration.
///
/// `Store` holds the data and per-operation semantics. Concurrent access,
/// the background sweep, and callback dispatch are layered on top by
/// [`Cache`](crate::cache::Cache), which keeps a `Store` behind one
/// reader/writer lock.
///
/// Expiry is lazy here: read operations treat a past-due entry as absent
/// without removing it, so reads never pay sweep cost.
pub struct Store {
    /// Key-value storage
    pub(crate) entries: HashMap<String, Entry>,
    /// TTL applied when a write passes [`Ttl::Default`]; `None` = never expire
    default_ttl: Option<Duration>,
    /// Hook fired on delete and sweep removals
    on_evicted: Option<EvictionCallback>,
    /// Performance counters
    pub(crate) stats: CacheStats,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.entries.len())
            .field("default_ttl", &self.default_ttl)
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}

impl Store {
    // == Constructor ==
    /// Creates a new store with the given default TTL.
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
            on_evicted: None,
            stats: CacheStats::new(),
        }
    }

    // == Expiry Resolution ==
    /// Resolves a requested TTL into an absolute expiration instant.
    ///
    /// `Ttl::Default` falls back to the configured default; a zero duration
    /// means never, like the default being unset.
    pub(crate) fn resolve_expiry(&self, ttl: Ttl) -> Option<u64> {
        let duration = match ttl {
            Ttl::Default => self.default_ttl?,
            Ttl::Never => return None,
            Ttl::After(duration) => duration,
        };
        if duration.is_zero() {
            return None;
        }
        Some(current_timestamp_ms() + duration.as_millis() as u64)
    }

    // == Set ==
    /// Upserts an entry.
    ///
    /// Overwrites silently; replacing an entry is not an eviction and fires
    /// no callback.
    pub fn set(&mut self, key: String, value: Value, ttl: Ttl) {
        let expires_at = self.resolve_expiry(ttl);
        self.entries.insert(key, Entry::new(value, expires_at));
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` if the key is absent or past its expiration; an
    /// expired entry is left in place for the sweep (or a later write) to
    /// reclaim.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.live_entry(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Looks up an entry, treating expired entries as absent.
    pub(crate) fn live_entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }

    // == Delete ==
    /// Removes an entry, returning its value if one was present.
    ///
    /// The caller is responsible for invoking the eviction callback with
    /// the returned value once the store lock has been released.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.remove(key).map(|entry| entry.value);
        if removed.is_some() {
            self.stats.record_evictions(1);
        }
        removed
    }

    // == Set Expiration ==
    /// Updates only the expiration of an existing entry.
    ///
    /// No-op (not an error) if the key is absent or already expired.
    pub fn set_expiration(&mut self, key: &str, ttl: Ttl) {
        let expires_at = self.resolve_expiry(ttl);
        if let Some(entry) = self
            .entries
            .get_mut(key)
            .filter(|entry| !entry.is_expired())
        {
            entry.expires_at = expires_at;
        }
    }

    // == Increment ==
    /// Adds `n` to a numeric entry in place, returning the updated value.
    ///
    /// Arithmetic wraps at the stored width. Fails with `NotFound` if the
    /// key is absent or expired, `TypeMismatch` if the value is not numeric.
    pub fn increment(&mut self, key: &str, n: i64) -> Result<Value> {
        self.apply_numeric(key, n, Value::incremented)
    }

    // == Decrement ==
    /// Subtracts `n` from a numeric entry in place, returning the updated value.
    pub fn decrement(&mut self, key: &str, n: i64) -> Result<Value> {
        self.apply_numeric(key, n, Value::decremented)
    }

    fn apply_numeric(
        &mut self,
        key: &str,
        n: i64,
        op: fn(&Value, i64) -> Option<Value>,
    ) -> Result<Value> {
        let entry = match self.entries.get_mut(key).filter(|e| !e.is_expired()) {
            Some(entry) => entry,
            None => return Err(CacheError::NotFound(key.to_string())),
        };
        match op(&entry.value, n) {
            Some(updated) => {
                entry.value = updated.clone();
                Ok(updated)
            }
            None => Err(CacheError::TypeMismatch(key.to_string())),
        }
    }

    // == Items ==
    /// Returns a point-in-time copy of all non-expired entries.
    ///
    /// A single clock reading covers the whole pass so the snapshot is
    /// internally consistent.
    pub fn items(&self) -> HashMap<String, Entry> {
        let now = current_timestamp_ms();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    // == Item Count ==
    /// Returns the raw entry count, including expired-but-unswept entries.
    pub fn item_count(&self) -> usize {
        self.entries.len()
    }

    // == Flush ==
    /// Clears all entries. A bulk clear is not an eviction: no callbacks fire.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    // == Eviction Callback ==
    /// Registers or replaces the eviction callback; `None` disables it.
    pub fn set_eviction_callback(&mut self, callback: Option<EvictionCallback>) {
        self.on_evicted = callback;
    }

    /// Returns a clone of the registered callback, if any.
    pub(crate) fn eviction_callback(&self) -> Option<EvictionCallback> {
        self.on_evicted.clone()
    }

    // == Sweep Expired ==
    /// Removes every expired entry.
    ///
    /// Returns the number of entries removed together with the
    /// `(key, value)` pairs to notify. Pairs are collected only while a
    /// callback is registered; each removal is reported at most once.
    pub(crate) fn sweep_expired(&mut self) -> (usize, Vec<(String, Value)>) {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let collect = self.on_evicted.is_some();
        let removed = expired_keys.len();
        let mut notify = Vec::new();
        for key in expired_keys {
            if let Some(entry) = self.entries.remove(&key) {
                if collect {
                    notify.push((key, entry.value));
                }
            }
        }

        self.stats.record_evictions(removed as u64);
        (removed, notify)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entries.len())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn store() -> Store {
        Store::new(None)
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();

        store.set("key1".to_string(), Value::from("value1"), Ttl::Never);

        assert_eq!(store.get("key1"), Some(Value::from("value1")));
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = store();
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store();

        store.set("key1".to_string(), Value::from("value1"), Ttl::Never);
        store.set("key1".to_string(), Value::from("value2"), Ttl::Never);

        assert_eq!(store.get("key1"), Some(Value::from("value2")));
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store();

        store.set("key1".to_string(), Value::from("value1"), Ttl::Never);

        assert_eq!(store.delete("key1"), Some(Value::from("value1")));
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.delete("key1"), None);
    }

    #[test]
    fn test_store_lazy_expiry() {
        let mut store = store();

        store.set(
            "short".to_string(),
            Value::from(1i64),
            Ttl::After(Duration::from_millis(30)),
        );

        assert_eq!(store.get("short"), Some(Value::I64(1)));
        sleep(Duration::from_millis(50));

        // Expired entry reads as absent but still occupies a slot until swept.
        assert_eq!(store.get("short"), None);
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_store_default_ttl_resolution() {
        let mut store = Store::new(Some(Duration::from_millis(30)));

        store.set("a".to_string(), Value::from(1i64), Ttl::Default);
        store.set("b".to_string(), Value::from(2i64), Ttl::Never);

        sleep(Duration::from_millis(50));

        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some(Value::I64(2)));
    }

    #[test]
    fn test_store_no_default_means_never() {
        let mut store = store();

        store.set("key".to_string(), Value::from(1i64), Ttl::Default);
        let items = store.items();
        assert_eq!(items["key"].expires_at, None);
    }

    #[test]
    fn test_store_zero_duration_means_never() {
        let mut store = store();

        store.set("key".to_string(), Value::from(1i64), Ttl::After(Duration::ZERO));
        assert_eq!(store.items()["key"].expires_at, None);
    }

    #[test]
    fn test_set_expiration_absent_is_noop() {
        let mut store = store();
        store.set_expiration("missing", Ttl::After(Duration::from_secs(1)));
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn test_set_expiration_arms_ttl() {
        let mut store = store();

        store.set("key".to_string(), Value::from(1i64), Ttl::Never);
        store.set_expiration("key", Ttl::After(Duration::from_millis(30)));

        sleep(Duration::from_millis(50));
        assert_eq!(store.get("key"), None);
    }

    #[test]
    fn test_set_expiration_clears_ttl() {
        let mut store = store();

        store.set(
            "key".to_string(),
            Value::from(1i64),
            Ttl::After(Duration::from_secs(60)),
        );
        store.set_expiration("key", Ttl::Never);

        assert_eq!(store.items()["key"].expires_at, None);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut store = store();

        store.set("count".to_string(), Value::from(10i64), Ttl::Never);

        assert_eq!(store.increment("count", 5).unwrap(), Value::I64(15));
        assert_eq!(store.decrement("count", 3).unwrap(), Value::I64(12));
        assert_eq!(store.get("count"), Some(Value::I64(12)));
    }

    #[test]
    fn test_increment_missing_key() {
        let mut store = store();
        assert!(matches!(
            store.increment("missing", 1),
            Err(CacheError::NotFound(_))
        ));
    }

    #[test]
    fn test_increment_expired_key() {
        let mut store = store();

        store.set(
            "gone".to_string(),
            Value::from(1i64),
            Ttl::After(Duration::from_millis(20)),
        );
        sleep(Duration::from_millis(40));

        assert!(matches!(
            store.increment("gone", 1),
            Err(CacheError::NotFound(_))
        ));
    }

    #[test]
    fn test_increment_type_mismatch() {
        let mut store = store();

        store.set("text".to_string(), Value::from("not a number"), Ttl::Never);

        assert!(matches!(
            store.increment("text", 1),
            Err(CacheError::TypeMismatch(_))
        ));
        assert!(matches!(
            store.decrement("text", 1),
            Err(CacheError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_items_excludes_expired() {
        let mut store = store();

        store.set(
            "stale".to_string(),
            Value::from(1i64),
            Ttl::After(Duration::from_millis(20)),
        );
        store.set("fresh".to_string(), Value::from(2i64), Ttl::Never);

        sleep(Duration::from_millis(40));

        let items = store.items();
        assert_eq!(items.len(), 1);
        assert!(items.contains_key("fresh"));
        // Raw count still includes the unswept entry.
        assert_eq!(store.item_count(), 2);
    }

    #[test]
    fn test_flush() {
        let mut store = store();

        store.set("a".to_string(), Value::from(1i64), Ttl::Never);
        store.set("b".to_string(), Value::from(2i64), Ttl::Never);

        store.flush();
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn test_sweep_removes_and_collects() {
        let mut store = store();
        store.set_eviction_callback(Some(Arc::new(|_, _| {})));

        store.set(
            "stale".to_string(),
            Value::from("old"),
            Ttl::After(Duration::from_millis(20)),
        );
        store.set("fresh".to_string(), Value::from("new"), Ttl::Never);

        sleep(Duration::from_millis(40));

        let (removed, notify) = store.sweep_expired();
        assert_eq!(removed, 1);
        assert_eq!(notify, vec![("stale".to_string(), Value::from("old"))]);
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_sweep_without_callback_skips_collection() {
        let mut store = store();

        store.set(
            "stale".to_string(),
            Value::from("old"),
            Ttl::After(Duration::from_millis(20)),
        );
        sleep(Duration::from_millis(40));

        let (removed, notify) = store.sweep_expired();
        assert_eq!(removed, 1);
        assert!(notify.is_empty());
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn test_stats_accuracy() {
        let mut store = store();

        store.set("key1".to_string(), Value::from("value1"), Ttl::Never);
        let _ = store.get("key1"); // hit
        let _ = store.get("nonexistent"); // miss
        let _ = store.delete("key1"); // eviction

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entries, 0);
    }
}
