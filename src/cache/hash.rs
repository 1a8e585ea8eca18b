//! Hash Operations Module
//!
//! Field-map operations layered on the store: a key's value may be a
//! field-to-value mapping manipulated one field at a time.

use std::collections::HashMap;

use crate::cache::{Entry, Store, Value};

impl Store {
    // == HSet ==
    /// Writes one field of the mapping stored under `key`.
    ///
    /// If the key is absent, expired, or holds a non-mapping value, the old
    /// value is discarded and a fresh mapping is started in its place.
    /// Callers rely on this auto-reinitialization, so it is deliberately
    /// not an error. Hash entries never expire: every field write pins the
    /// entry's expiration to "never", overriding any prior TTL.
    pub fn hset(&mut self, key: &str, field: &str, value: Value) {
        let mut map = match self.entries.remove(key) {
            Some(entry) if !entry.is_expired() => match entry.value {
                Value::Hash(map) => map,
                _ => HashMap::new(),
            },
            _ => HashMap::new(),
        };
        map.insert(field.to_string(), value);
        self.entries
            .insert(key.to_string(), Entry::new(Value::Hash(map), None));
    }

    // == HGet ==
    /// Reads one field of the mapping stored under `key`.
    ///
    /// Returns `None` if the key is absent or expired, the field is
    /// missing, or the stored value is not a mapping.
    pub fn hget(&self, key: &str, field: &str) -> Option<Value> {
        let found = self.live_entry(key).and_then(|entry| match &entry.value {
            Value::Hash(map) => map.get(field).cloned(),
            _ => None,
        });
        match found {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == HGetAll ==
    /// Returns a copy of the whole mapping stored under `key`.
    pub fn hget_all(&self, key: &str) -> Option<HashMap<String, Value>> {
        let found = self.live_entry(key).and_then(|entry| match &entry.value {
            Value::Hash(map) => Some(map.clone()),
            _ => None,
        });
        match found {
            Some(map) => {
                self.stats.record_hit();
                Some(map)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == HDel ==
    /// Removes a single field, leaving the mapping in place even if it is
    /// now empty. No-op if the key is absent, expired, or not a mapping.
    pub fn hdel(&mut self, key: &str, field: &str) {
        if let Some(entry) = self
            .entries
            .get_mut(key)
            .filter(|entry| !entry.is_expired())
        {
            if let Value::Hash(map) = &mut entry.value {
                map.remove(field);
            }
        }
    }
}
