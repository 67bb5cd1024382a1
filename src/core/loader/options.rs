//! Loader configuration
//!
//! All knobs are optional and independently togglable: batching and
//! memoization default to on, the cache-key transform defaults to the
//! identity, and the memo store defaults to an unbounded in-process map.

use std::hash::Hash;
use std::sync::Arc;

use crate::core::deferred::Deferred;
use crate::core::fetch::Fetcher;
use crate::core::loader::Loader;
use crate::core::store::{InMemoryStore, MemoStore};

pub(crate) type CacheKeyFn<K, C> = Arc<dyn Fn(&K) -> C + Send + Sync>;

/// Builder for a [`Loader`].
///
/// `K` is the raw submission key, `V` the loaded value, `C` the cache key
/// produced by the transform (defaults to `K` with an identity transform).
pub struct LoaderBuilder<K, V, C = K> {
    pub(crate) fetcher: Arc<dyn Fetcher<K, V>>,
    pub(crate) batch: bool,
    pub(crate) memoize: bool,
    pub(crate) cache_key_fn: CacheKeyFn<K, C>,
    pub(crate) store: Arc<dyn MemoStore<C, Deferred<V>>>,
}

impl<K, V> LoaderBuilder<K, V, K>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(fetcher: Arc<dyn Fetcher<K, V>>) -> Self {
        Self {
            fetcher,
            batch: true,
            memoize: true,
            cache_key_fn: Arc::new(|key: &K| key.clone()),
            store: Arc::new(InMemoryStore::new()),
        }
    }
}

impl<K, V, C> LoaderBuilder<K, V, C>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Whether concurrently-issued submissions are grouped into one batch
    /// via a deferred dispatch tick. When off, every submission dispatches
    /// its own single-key batch synchronously.
    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Whether results are memoized, deduplicating concurrent and repeat
    /// submissions for the same cache key.
    pub fn memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Sets the transform from raw key to cache key.
    ///
    /// May change the cache-key type, which resets any configured store to
    /// the default in-memory one; call [`store`](Self::store) after this.
    pub fn cache_key_fn<C2>(
        self,
        cache_key_fn: impl Fn(&K) -> C2 + Send + Sync + 'static,
    ) -> LoaderBuilder<K, V, C2>
    where
        C2: Eq + Hash + Clone + Send + Sync + 'static,
    {
        LoaderBuilder {
            fetcher: self.fetcher,
            batch: self.batch,
            memoize: self.memoize,
            cache_key_fn: Arc::new(cache_key_fn),
            store: Arc::new(InMemoryStore::new()),
        }
    }

    /// Swaps in a custom memo store, e.g. a bounded or shared one.
    pub fn store(mut self, store: Arc<dyn MemoStore<C, Deferred<V>>>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> Loader<K, V, C> {
        Loader::from_builder(self)
    }
}
