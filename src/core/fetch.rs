//! Batch-fetch contract
//!
//! The caller-supplied function the loader amortizes its submissions into.
//! Given a non-empty ordered key list (duplicates permitted, this layer
//! does not dedup within one dispatch), a fetcher returns either one fatal
//! error for the whole batch, or a result list of exactly the same length
//! and order as the keys, each position a value or a per-key error.

use std::future::Future;

use async_trait::async_trait;

use crate::utils::error::Result;

/// Batch-fetch function behind the loader.
#[async_trait]
pub trait Fetcher<K, V>: Send + Sync
where
    K: Send + 'static,
    V: Send + 'static,
{
    /// Fetches every key in `keys`, positionally.
    ///
    /// The outer `Err` rejects the whole batch; an inner `Err` rejects
    /// only its position and is memoized like any other outcome.
    async fn fetch(&self, keys: Vec<K>) -> Result<Vec<Result<V>>>;
}

/// Adapts an async closure into a [`Fetcher`].
pub struct FetchFn<F> {
    func: F,
}

impl<F> FetchFn<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<K, V, F, Fut> Fetcher<K, V> for FetchFn<F>
where
    K: Send + 'static,
    V: Send + 'static,
    F: Fn(Vec<K>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Result<V>>>> + Send + 'static,
{
    async fn fetch(&self, keys: Vec<K>) -> Result<Vec<Result<V>>> {
        (self.func)(keys).await
    }
}
