//! List Operations Module
//!
//! Double-ended sequence operations layered on the store. The `l` family
//! works one end of the sequence (the back), the `r` family the other, so
//! `lpush`/`lpop` together behave as a stack and `lpush`/`rpop` as a queue.

use std::collections::VecDeque;

use crate::cache::{Entry, Store, Value};

/// Which end of the sequence an operation targets.
enum End {
    Front,
    Back,
}

impl Store {
    // == LPush ==
    /// Appends a value at the back end of the sequence under `key`.
    ///
    /// If the key is absent, expired, or holds a non-sequence value, the
    /// old value is discarded and a fresh sequence is started (the same
    /// auto-reinitialization policy as the hash operations). A fresh entry
    /// is created never-expiring; pushes onto an existing sequence leave
    /// whatever expiration the entry carries untouched.
    pub fn lpush(&mut self, key: &str, value: Value) {
        self.push(key, value, End::Back);
    }

    // == RPush ==
    /// Appends a value at the front end of the sequence under `key`.
    pub fn rpush(&mut self, key: &str, value: Value) {
        self.push(key, value, End::Front);
    }

    // == LPop ==
    /// Removes and returns the back element of the sequence under `key`.
    ///
    /// Returns `None` if the key is absent, expired, or not a sequence.
    /// Popping the last element removes the entry entirely; an empty
    /// sequence is never retained.
    pub fn lpop(&mut self, key: &str) -> Option<Value> {
        self.pop(key, End::Back)
    }

    // == RPop ==
    /// Removes and returns the front element of the sequence under `key`.
    pub fn rpop(&mut self, key: &str) -> Option<Value> {
        self.pop(key, End::Front)
    }

    fn push(&mut self, key: &str, value: Value, end: End) {
        let (mut list, expires_at) = match self.entries.remove(key) {
            Some(entry) if !entry.is_expired() => match entry.value {
                Value::List(list) => (list, entry.expires_at),
                _ => (VecDeque::new(), None),
            },
            _ => (VecDeque::new(), None),
        };
        match end {
            End::Back => list.push_back(value),
            End::Front => list.push_front(value),
        }
        self.entries
            .insert(key.to_string(), Entry::new(Value::List(list), expires_at));
    }

    fn pop(&mut self, key: &str, end: End) -> Option<Value> {
        let entry = self
            .entries
            .get_mut(key)
            .filter(|entry| !entry.is_expired())?;
        let list = match &mut entry.value {
            Value::List(list) => list,
            _ => return None,
        };
        let popped = match end {
            End::Back => list.pop_back(),
            End::Front => list.pop_front(),
        }?;
        if list.is_empty() {
            // Removal of an emptied sequence is not an eviction: no callback.
            self.entries.remove(key);
        }
        Some(popped)
    }
}
