//! Memo store integration tests
//!
//! Verifies the pluggable-store seam: a custom store observing loader
//! traffic, and one store shared between loader instances.

#[cfg(test)]
mod tests {
    use std::hash::Hash;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use batchload::{Deferred, Fetcher, InMemoryStore, Loader, MemoStore, Result};

    /// Doubles numeric keys, counting fetch calls.
    #[derive(Clone, Default)]
    struct CountedDoubler {
        calls: Arc<AtomicUsize>,
    }

    impl CountedDoubler {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher<u32, u32> for CountedDoubler {
        async fn fetch(&self, keys: Vec<u32>) -> Result<Vec<Result<u32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(keys.into_iter().map(|key| Ok(key * 2)).collect())
        }
    }

    /// Wraps the default store and counts operations.
    struct CountingStore<K, V> {
        inner: InMemoryStore<K, V>,
        gets: AtomicUsize,
        sets: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl<K, V> CountingStore<K, V>
    where
        K: Eq + Hash,
    {
        fn new() -> Self {
            Self {
                inner: InMemoryStore::new(),
                gets: AtomicUsize::new(0),
                sets: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl<K, V> MemoStore<K, V> for CountingStore<K, V>
    where
        K: Eq + Hash + Send + Sync,
        V: Clone + Send + Sync,
    {
        async fn get(&self, key: &K) -> Option<V> {
            self.gets.fetch_add(1, Ordering::Relaxed);
            self.inner.get(key).await
        }

        async fn set(&self, key: K, value: V) {
            self.sets.fetch_add(1, Ordering::Relaxed);
            self.inner.set(key, value).await;
        }

        async fn delete(&self, key: &K) {
            self.deletes.fetch_add(1, Ordering::Relaxed);
            self.inner.delete(key).await;
        }

        async fn clear(&self) {
            self.inner.clear().await;
        }
    }

    #[tokio::test]
    async fn custom_store_sees_loader_traffic() {
        let store = Arc::new(CountingStore::<u32, Deferred<u32>>::new());
        let fetcher = CountedDoubler::default();
        let loader = Loader::builder(fetcher.clone())
            .store(store.clone())
            .build();

        assert_eq!(loader.load(1).await, Ok(2));
        assert_eq!(loader.load(1).await, Ok(2));

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(store.sets.load(Ordering::Relaxed), 1);
        assert!(store.gets.load(Ordering::Relaxed) >= 2);

        loader.clear(&1).await;
        assert_eq!(store.deletes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn store_shared_between_loaders_dedups_across_them() {
        let store = Arc::new(InMemoryStore::<u32, Deferred<u32>>::new());
        let fetcher = CountedDoubler::default();

        let first = Loader::builder(fetcher.clone())
            .store(store.clone())
            .build();
        let second = Loader::builder(fetcher.clone())
            .store(store.clone())
            .build();

        assert_eq!(first.load(21).await, Ok(42));
        // the second loader adopts the entry the first one memoized
        assert_eq!(second.load(21).await, Ok(42));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn clear_all_through_one_loader_is_visible_to_the_other() {
        let store = Arc::new(InMemoryStore::<u32, Deferred<u32>>::new());
        let fetcher = CountedDoubler::default();

        let first = Loader::builder(fetcher.clone())
            .store(store.clone())
            .build();
        let second = Loader::builder(fetcher.clone())
            .store(store.clone())
            .build();

        assert_eq!(first.load(3).await, Ok(6));
        second.clear_all().await;
        assert_eq!(first.load(3).await, Ok(6));
        assert_eq!(fetcher.calls(), 2);
    }
}
