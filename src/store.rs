//! An in-memory map that remembers the order keys were first inserted in.
//!
//! Every operation takes the same exclusive lock for its whole duration, so
//! concurrent callers never observe a half-applied change.

use std::collections::HashMap;

use parking_lot::Mutex;

pub struct Store<V> {
    inner: Mutex<Entries<V>>,
}

struct Entries<V> {
    values: HashMap<String, V>,
    // insertion order, one entry per live key
    order: Vec<String>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Store<V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Entries {
                values: HashMap::new(),
                order: Vec::with_capacity(1024),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Store<V> {
    /// Insert or overwrite. An existing key keeps its place in the order.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut entries = self.inner.lock();

        if entries.values.insert(key.clone(), value).is_none() {
            entries.order.push(key);
        }
    }

    /// Insert only if `key` is absent, returning whether the value went in.
    pub fn insert(&self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        let mut entries = self.inner.lock();

        if entries.values.contains_key(&key) {
            return false;
        }

        entries.values.insert(key.clone(), value);
        entries.order.push(key);
        true
    }

    /// Overwrite an existing key, returning the old value. Absent keys are left
    /// absent.
    pub fn replace(&self, key: &str, value: V) -> Option<V> {
        let mut entries = self.inner.lock();

        entries
            .values
            .get_mut(key)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().values.get(key).cloned()
    }

    /// A copy of every value, in insertion order.
    pub fn list(&self) -> Vec<V> {
        let entries = self.inner.lock();

        entries
            .order
            .iter()
            .filter_map(|key| entries.values.get(key))
            .cloned()
            .collect()
    }

    /// Remove a key, returning its value. Removing an absent key is a no-op.
    pub fn delete(&self, key: &str) -> Option<V> {
        let mut entries = self.inner.lock();

        let value = entries.values.remove(key)?;
        if let Some(index) = entries.order.iter().position(|k| k == key) {
            entries.order.remove(index);
        }

        Some(value)
    }
}
