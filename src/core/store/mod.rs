//! Pluggable memo store
//!
//! Maps cache keys to in-flight or completed deferred results. The loader
//! only ever talks to the store through this trait behind an `Arc`, so a
//! store can be swapped for a bounded or instrumented implementation and
//! shared across loader instances.

use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use parking_lot::RwLock;

/// Key-to-value mapping contract for memoized loads.
///
/// Implementations must tolerate concurrent callers, with last-write-wins
/// semantics on [`set`](MemoStore::set) and [`clear`](MemoStore::clear)
/// replacing the contents as one step: a concurrent reader sees the store
/// either before or after a clear, never partially emptied.
#[async_trait]
pub trait MemoStore<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Returns the stored value for `key`, if any.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: K, value: V);

    /// Removes the entry for `key`; no-op if absent.
    async fn delete(&self, key: &K);

    /// Removes every entry.
    async fn clear(&self);
}

/// Default unbounded in-process store.
///
/// A reader/writer lock over a plain map: mutations are short and never
/// held across an await, and the whole map can be swapped out atomically
/// on clear.
pub struct InMemoryStore<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryStore<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Current number of memoized entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> Default for InMemoryStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> MemoStore<K, V> for InMemoryStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    async fn set(&self, key: K, value: V) {
        self.entries.write().insert(key, value);
    }

    async fn delete(&self, key: &K) {
        self.entries.write().remove(key);
    }

    async fn clear(&self) {
        // Replace the whole map under one lock acquisition; no reader can
        // observe a partially cleared store.
        *self.entries.write() = HashMap::new();
    }
}
