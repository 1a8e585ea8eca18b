//! Configuration Module
//!
//! Handles cache configuration, optionally loaded from environment variables.

use std::env;
use std::time::Duration;

// == Config ==
/// Cache configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// TTL applied when a write passes the "use default" sentinel;
    /// `None` means entries never expire by default
    pub default_expiration: Option<Duration>,
    /// Period of the background sweep; `None` disables it entirely
    pub cleanup_interval: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_EXPIRATION_MS` - default TTL in milliseconds, 0 = never
    ///   (default: 0)
    /// - `CLEANUP_INTERVAL_MS` - sweep period in milliseconds, 0 = disabled
    ///   (default: 300000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_expiration: env_duration_ms("DEFAULT_EXPIRATION_MS")
                .unwrap_or(defaults.default_expiration),
            cleanup_interval: env_duration_ms("CLEANUP_INTERVAL_MS")
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Sets the TTL applied when a write passes the "use default" sentinel.
    pub fn with_default_expiration(mut self, ttl: Duration) -> Self {
        self.default_expiration = Some(ttl);
        self
    }

    /// Sets the background sweep period.
    pub fn with_cleanup_interval(mut self, every: Duration) -> Self {
        self.cleanup_interval = Some(every);
        self
    }

    /// Disables the background sweep; expired entries are then reclaimed
    /// only lazily, when a write or snapshot touches them.
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup_interval = None;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_expiration: None,
            cleanup_interval: Some(Duration::from_secs(300)),
        }
    }
}

/// Reads a millisecond duration from the environment; `Some(None)` means
/// the variable was set to 0 (explicitly disabled).
fn env_duration_ms(name: &str) -> Option<Option<Duration>> {
    let ms: u64 = env::var(name).ok()?.parse().ok()?;
    if ms == 0 {
        Some(None)
    } else {
        Some(Some(Duration::from_millis(ms)))
    }
}
