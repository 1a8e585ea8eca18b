//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Reaper: removes expired cache entries at configured intervals

mod reaper;

pub(crate) use reaper::{notify_evicted, spawn_reaper};
