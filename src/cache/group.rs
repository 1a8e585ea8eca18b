//! In-Flight Computation Registry
//!
//! Collapses concurrent cache-miss computations for the same key into a
//! single execution whose outcome fans out to every waiter. The registry
//! is transient bookkeeping, not a cache: a key is present only while a
//! computation for it is running, and is removed the moment it settles.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::cache::Value;
use crate::error::Result;

/// Observable state of one in-flight computation: `None` while it runs,
/// `Some(outcome)` once settled.
type Outcome = Option<Result<Value>>;

type Registry = Arc<Mutex<HashMap<String, watch::Receiver<Outcome>>>>;

// == Group ==
/// Per-key registry of in-flight computations.
///
/// Synchronization is deliberately independent of the store lock: joining
/// takes a short mutex critical section and waiting happens on a watch
/// channel, so a slow computation never serializes unrelated keys.
#[derive(Default)]
pub(crate) struct Group {
    inflight: Registry,
}

/// What a caller became when it joined the group for a key.
pub(crate) enum Role {
    /// Sole computer for the key; must settle (or drop) the flight.
    Leader(Flight),
    /// Another caller is computing; await its outcome.
    Waiter(watch::Receiver<Outcome>),
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    // == Join ==
    /// Registers interest in `key`.
    ///
    /// The first caller for a key becomes its [`Role::Leader`]; everyone
    /// arriving while that flight is open becomes a [`Role::Waiter`] on
    /// the same outcome. At most one flight exists per key at any instant.
    pub fn join(&self, key: &str) -> Role {
        let mut inflight = self.inflight.lock();
        if let Some(rx) = inflight.get(key) {
            return Role::Waiter(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        inflight.insert(key.to_string(), rx);
        Role::Leader(Flight {
            key: key.to_string(),
            tx,
            inflight: Arc::clone(&self.inflight),
        })
    }

    // == Wait ==
    /// Awaits the outcome of another caller's flight.
    ///
    /// Returns `None` if the leader was dropped before settling; the
    /// caller should then restart from its own cache check.
    pub async fn wait(mut rx: watch::Receiver<Outcome>) -> Option<Result<Value>> {
        loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                return Some(outcome);
            }
            if rx.changed().await.is_err() {
                // Sender gone: either it settled just before dropping or
                // the leader was cancelled mid-flight.
                return rx.borrow().clone();
            }
        }
    }
}

// == Flight ==
/// The leader's handle on an open computation.
///
/// Dropping the flight (settled or not) removes the key's registration, so
/// a cancelled leader can never leave waiters permanently stuck.
pub(crate) struct Flight {
    key: String,
    tx: watch::Sender<Outcome>,
    inflight: Registry,
}

impl Flight {
    /// Publishes the outcome to every waiter and closes the flight.
    pub fn settle(self, outcome: Result<Value>) {
        // Waiters that already hold a receiver still observe the value
        // after the registration disappears in Drop.
        let _ = self.tx.send(Some(outcome));
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        self.inflight.lock().remove(&self.key);
    }
}
