//! Pending-request queue
//!
//! Buffers the submissions accumulated since the previous dispatch. The
//! drain swaps the internal buffer for a fresh one, so a new queue
//! generation fills up concurrently with an in-flight batch fetch and no
//! item ever appears in two dispatches.

use parking_lot::Mutex;

use crate::core::deferred::Resolver;

/// One submission awaiting dispatch: the raw key plus the resolver that
/// completes its deferred result.
pub struct Pending<K, V> {
    /// Caller-supplied key, in submission order within a generation.
    pub key: K,
    /// Completes this submission's deferred result.
    pub resolver: Resolver<V>,
}

/// Concurrency-safe append/drain buffer of pending submissions.
pub struct PendingQueue<K, V> {
    items: Mutex<Vec<Pending<K, V>>>,
}

impl<K, V> PendingQueue<K, V> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Appends an item and returns the queue length after the push.
    ///
    /// A return of 1 marks the empty-to-non-empty transition: that caller
    /// owns scheduling the next dispatch.
    pub fn push(&self, item: Pending<K, V>) -> usize {
        let mut items = self.items.lock();
        items.push(item);
        items.len()
    }

    /// Atomically takes the current generation, leaving an empty buffer.
    ///
    /// Items pushed after the swap belong to the next generation.
    pub fn drain(&self) -> Vec<Pending<K, V>> {
        std::mem::take(&mut *self.items.lock())
    }

    /// Current number of pending items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for PendingQueue<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
