//! Process-Wide Default Cache
//!
//! A lazily constructed shared cache instance plus free functions
//! mirroring the full operation surface, for callers that want one cache
//! per process without threading a handle around.

use std::collections::HashMap;
use std::future::Future;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::cache::{Cache, Entry, StatsSnapshot, Ttl, Value};
use crate::config::Config;
use crate::error::Result;

static DEFAULT: Lazy<RwLock<Option<Cache>>> = Lazy::new(|| RwLock::new(None));

// == Lifecycle ==
/// Installs the process-wide cache with an explicit configuration.
///
/// Exactly one initialization wins no matter how many threads race.
/// Returns true if this call installed the instance; false if one already
/// existed, in which case the given configuration is ignored.
pub fn init(config: Config) -> bool {
    let mut slot = DEFAULT.write();
    if slot.is_some() {
        return false;
    }
    *slot = Some(Cache::new(config));
    true
}

/// Returns the process-wide cache, constructing it with [`Config::default`]
/// on first use.
pub fn default_cache() -> Cache {
    if let Some(cache) = DEFAULT.read().as_ref() {
        return cache.clone();
    }
    let mut slot = DEFAULT.write();
    slot.get_or_insert_with(|| Cache::new(Config::default())).clone()
}

/// Discards the process-wide instance so the next use re-initializes.
///
/// Intended for tests. The discarded instance keeps serving outstanding
/// clones; its background sweep stops once the last clone is dropped.
pub fn reset() {
    *DEFAULT.write() = None;
}

// == Operation Surface ==
/// See [`Cache::set`].
pub async fn set(key: &str, value: impl Into<Value>, ttl: Ttl) {
    default_cache().set(key, value, ttl).await
}

/// See [`Cache::get`].
pub async fn get(key: &str) -> Option<Value> {
    default_cache().get(key).await
}

/// See [`Cache::delete`].
pub async fn delete(key: &str) -> bool {
    default_cache().delete(key).await
}

/// See [`Cache::set_expiration`].
pub async fn set_expiration(key: &str, ttl: Ttl) {
    default_cache().set_expiration(key, ttl).await
}

/// See [`Cache::increment`].
pub async fn increment(key: &str, n: i64) -> Result<Value> {
    default_cache().increment(key, n).await
}

/// See [`Cache::decrement`].
pub async fn decrement(key: &str, n: i64) -> Result<Value> {
    default_cache().decrement(key, n).await
}

/// See [`Cache::hset`].
pub async fn hset(key: &str, field: &str, value: impl Into<Value>) {
    default_cache().hset(key, field, value).await
}

/// See [`Cache::hget`].
pub async fn hget(key: &str, field: &str) -> Option<Value> {
    default_cache().hget(key, field).await
}

/// See [`Cache::hget_all`].
pub async fn hget_all(key: &str) -> Option<HashMap<String, Value>> {
    default_cache().hget_all(key).await
}

/// See [`Cache::hdel`].
pub async fn hdel(key: &str, field: &str) {
    default_cache().hdel(key, field).await
}

/// See [`Cache::lpush`].
pub async fn lpush(key: &str, value: impl Into<Value>) {
    default_cache().lpush(key, value).await
}

/// See [`Cache::rpush`].
pub async fn rpush(key: &str, value: impl Into<Value>) {
    default_cache().rpush(key, value).await
}

/// See [`Cache::lpop`].
pub async fn lpop(key: &str) -> Option<Value> {
    default_cache().lpop(key).await
}

/// See [`Cache::rpop`].
pub async fn rpop(key: &str) -> Option<Value> {
    default_cache().rpop(key).await
}

/// See [`Cache::items`].
pub async fn items() -> HashMap<String, Entry> {
    default_cache().items().await
}

/// See [`Cache::item_count`].
pub async fn item_count() -> usize {
    default_cache().item_count().await
}

/// See [`Cache::flush`].
pub async fn flush() {
    default_cache().flush().await
}

/// See [`Cache::on_evicted`].
pub async fn on_evicted<F>(callback: F)
where
    F: Fn(&str, Value) + Send + Sync + 'static,
{
    default_cache().on_evicted(callback).await
}

/// See [`Cache::clear_eviction_callback`].
pub async fn clear_eviction_callback() {
    default_cache().clear_eviction_callback().await
}

/// See [`Cache::stats`].
pub async fn stats() -> StatsSnapshot {
    default_cache().stats().await
}

/// See [`Cache::memoize`].
pub async fn memoize<F, Fut>(key: &str, ttl: Ttl, compute: F) -> Result<Value>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<Value>>,
{
    default_cache().memoize(key, ttl, compute).await
}
