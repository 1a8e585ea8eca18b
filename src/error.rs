//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! Plain misses are not errors anywhere in the crate: `get`, the hash and
//! list reads, and the pops signal "not found" through their return value.
//! Only the numeric operations and memoize surface `CacheError`.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// `Clone` so a single memoize failure can be delivered to every fan-in
/// waiter of the same computation.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Key absent, or present but past its expiration
    #[error("key not found: {0}")]
    NotFound(String),

    /// Numeric operation on a non-numeric stored value
    #[error("the value for {0} is not numeric")]
    TypeMismatch(String),

    /// A memoized computation failed; nothing was written to the cache
    #[error("memoized computation failed: {0}")]
    Compute(Arc<anyhow::Error>),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
