//! Request-coalescing loader
//!
//! The orchestrator: owns the pending queue and the memo store, collapses
//! concurrent duplicate submissions into one pending result, groups
//! concurrently-issued distinct keys into a single batch-fetch call, and
//! fans the positional results back out to the original callers.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::deferred::Deferred;
use crate::core::fanout::fan_out;
use crate::core::fetch::Fetcher;
use crate::core::queue::{Pending, PendingQueue};
use crate::core::store::MemoStore;
use crate::utils::error::{LoadError, Result};

pub mod options;

pub use options::LoaderBuilder;

use options::CacheKeyFn;

/// One tick of deferral between the first submission of a generation and
/// its dispatch, long enough for a synchronous burst of submissions to
/// join the batch.
const DISPATCH_TICK: Duration = Duration::from_millis(1);

/// Batching, deduplicating front for an expensive multi-key fetch.
///
/// Cheap to clone; clones share the queue, memo store, and configuration.
pub struct Loader<K, V, C = K> {
    inner: Arc<LoaderInner<K, V, C>>,
}

impl<K, V, C> Clone for Loader<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct LoaderInner<K, V, C> {
    fetcher: Arc<dyn Fetcher<K, V>>,
    batch: bool,
    memoize: bool,
    cache_key_fn: CacheKeyFn<K, C>,
    store: Arc<dyn MemoStore<C, Deferred<V>>>,
    queue: PendingQueue<K, V>,
    /// Serializes {memo lookup, deferred creation, memo insert, queue push,
    /// first-pusher scheduling} per loader instance. Never held across the
    /// fetch call or a deferred wait.
    gate: Mutex<()>,
}

impl<K, V> Loader<K, V, K>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a loader with default options: batching and memoization on,
    /// identity cache key, in-memory store.
    pub fn new(fetcher: impl Fetcher<K, V> + 'static) -> Self {
        Self::builder(fetcher).build()
    }

    /// Starts configuring a loader.
    pub fn builder(fetcher: impl Fetcher<K, V> + 'static) -> LoaderBuilder<K, V, K> {
        LoaderBuilder::new(Arc::new(fetcher))
    }
}

impl<K, V, C> Loader<K, V, C>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub(crate) fn from_builder(builder: LoaderBuilder<K, V, C>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                fetcher: builder.fetcher,
                batch: builder.batch,
                memoize: builder.memoize,
                cache_key_fn: builder.cache_key_fn,
                store: builder.store,
                queue: PendingQueue::new(),
                gate: Mutex::new(()),
            }),
        }
    }

    /// Loads the value for `key`, suspending until it is available.
    ///
    /// Concurrent loads for the same cache key share one pending result
    /// and the underlying fetch sees the key once. Distinct keys submitted
    /// within one dispatch tick are fetched together in a single batch.
    pub async fn load(&self, key: K) -> Result<V> {
        let deferred = self.submit(key).await;
        deferred.wait().await
    }

    /// [`load`](Self::load) for callers holding an optional key: `None`
    /// fails with [`LoadError::InvalidKey`] before anything is enqueued.
    pub async fn load_opt(&self, key: Option<K>) -> Result<V> {
        match key {
            Some(key) => self.load(key).await,
            None => Err(LoadError::InvalidKey),
        }
    }

    /// Loads many keys in parallel, returning values in input order.
    ///
    /// The first error among the parallel submissions fails the whole
    /// call; the remaining submissions stay in their batches and finish in
    /// the background, their results discarded.
    pub async fn load_many(&self, keys: Vec<K>) -> Result<Vec<V>> {
        let loader = self.clone();
        fan_out(keys, move |key| {
            let loader = loader.clone();
            async move { loader.load(key).await }
        })
        .await
    }

    /// Drops the memo entry for `key`; a later load re-fetches it.
    pub async fn clear(&self, key: &K) {
        let cache_key = (self.inner.cache_key_fn)(key);
        self.inner.store.delete(&cache_key).await;
    }

    /// Drops every memo entry.
    pub async fn clear_all(&self) {
        self.inner.store.clear().await;
    }

    /// Seeds the memo with an already-loaded value.
    ///
    /// No-op if an entry for the cache key already exists; priming never
    /// overrides an in-flight or completed load.
    pub async fn prime(&self, key: K, value: V) {
        self.prime_result(key, Ok(value)).await;
    }

    /// Seeds the memo with a negative result, replayed to later loads.
    pub async fn prime_err(&self, key: K, error: LoadError) {
        self.prime_result(key, Err(error)).await;
    }

    async fn prime_result(&self, key: K, result: Result<V>) {
        let inner = &self.inner;
        let _gate = inner.gate.lock().await;
        let cache_key = (inner.cache_key_fn)(&key);
        if inner.store.get(&cache_key).await.is_none() {
            inner.store.set(cache_key, Deferred::resolved(result)).await;
        }
    }

    /// Steps 1-5 of a submission, under the loader gate: memo lookup,
    /// deferred creation, memo insert, queue push, and the first-pusher
    /// dispatch-scheduling decision. Returns the deferred to wait on.
    async fn submit(&self, key: K) -> Deferred<V> {
        let inner = &self.inner;
        let gate = inner.gate.lock().await;

        let cache_key = (inner.cache_key_fn)(&key);
        if inner.memoize {
            if let Some(existing) = inner.store.get(&cache_key).await {
                debug!("memo hit, adopting pending result");
                return existing;
            }
        }

        let (deferred, resolver) = Deferred::new();
        // Memoize before enqueuing: a concurrent submission for the same
        // key must hit the memo, not add a second queue item.
        if inner.memoize {
            inner.store.set(cache_key, deferred.clone()).await;
        }

        let pending = inner.queue.push(Pending { key, resolver });
        if pending == 1 {
            if inner.batch {
                debug!("scheduling deferred dispatch");
                let loader = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(DISPATCH_TICK).await;
                    loader.dispatch().await;
                });
            } else {
                // Single-key dispatch, synchronously and outside the gate.
                // Pushes only happen under the gate, so the drained
                // generation is exactly this submission.
                let items = inner.queue.drain();
                drop(gate);
                self.run_batch(items).await;
            }
        }

        deferred
    }

    /// Dispatches the current queue generation.
    async fn dispatch(&self) {
        let items = self.inner.queue.drain();
        self.run_batch(items).await;
    }

    /// One batch-fetch call plus fan-out of its positional results.
    async fn run_batch(&self, items: Vec<Pending<K, V>>) {
        if items.is_empty() {
            return;
        }

        let expected = items.len();
        let keys: Vec<K> = items.iter().map(|item| item.key.clone()).collect();
        debug!(keys = expected, "dispatching batch");

        match self.inner.fetcher.fetch(keys).await {
            Ok(results) if results.len() == expected => {
                for (item, result) in items.into_iter().zip(results) {
                    // A per-key error resolves only its item and stays
                    // memoized: a valid, cacheable negative outcome.
                    item.resolver.resolve(result);
                }
            }
            Ok(results) => {
                let error = LoadError::BatchShape {
                    expected,
                    returned: results.len(),
                };
                warn!(expected, returned = results.len(), "batch shape mismatch");
                self.reject_batch(items, error).await;
            }
            Err(error) => {
                warn!(keys = expected, %error, "batch fetch failed");
                self.reject_batch(items, error).await;
            }
        }
    }

    /// Whole-batch failure: evict every item's memo entry so the failed
    /// attempt does not poison later submissions, then reject each waiter.
    async fn reject_batch(&self, items: Vec<Pending<K, V>>, error: LoadError) {
        for item in items {
            let cache_key = (self.inner.cache_key_fn)(&item.key);
            self.inner.store.delete(&cache_key).await;
            item.resolver.resolve(Err(error.clone()));
        }
    }
}
