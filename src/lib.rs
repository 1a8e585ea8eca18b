//! Larder - a concurrency-safe in-memory cache
//!
//! Provides key/value storage with TTL expiration, compound hash and list
//! values, eviction notification, and a memoize facility that collapses
//! concurrent cache-miss computations into a single execution per key.
//!
//! Expired entries are hidden from reads immediately (lazy expiry) and
//! reclaimed in the background by a sweep task when a cleanup interval is
//! configured.
//!
//! ```no_run
//! use std::time::Duration;
//! use larder::{Cache, Config, Ttl, Value};
//!
//! # async fn demo() -> larder::Result<()> {
//! let cache = Cache::new(Config::default());
//!
//! cache.set("session", "alice", Ttl::After(Duration::from_secs(60))).await;
//! assert_eq!(cache.get("session").await, Some(Value::from("alice")));
//!
//! let loaded = cache
//!     .memoize("settings", Ttl::Never, || async {
//!         Ok(Value::from("expensive result"))
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod global;
mod tasks;

pub use cache::{Cache, Entry, StatsSnapshot, Ttl, Value};
pub use config::Config;
pub use error::{CacheError, Result};
