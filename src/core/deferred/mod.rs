//! Single-write / multi-read deferred result
//!
//! A [`Deferred`] is the handle one load submission hands out to every
//! caller interested in the same key. Exactly one producer resolves it,
//! exactly once; any number of consumers may await it, before or after
//! resolution. Once resolved the stored result is immutable and repeat
//! reads return it without suspending.
//!
//! Built on [`tokio::sync::watch`]: the [`Resolver`] owns the sender and
//! is consumed by [`Resolver::resolve`], which makes double-resolution
//! unrepresentable.

use std::future::Future;

use tokio::sync::watch;

use crate::utils::error::{LoadError, Result};

/// Multi-consumer handle to a result that may not have been produced yet.
///
/// Cloning is cheap and every clone observes the same resolution.
pub struct Deferred<V> {
    rx: watch::Receiver<Option<Result<V>>>,
}

impl<V> Clone for Deferred<V> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

/// Write-once producer side of a [`Deferred`].
pub struct Resolver<V> {
    tx: watch::Sender<Option<Result<V>>>,
}

impl<V> Resolver<V> {
    /// Stores the result and wakes every current and future waiter.
    ///
    /// Consumes the resolver: a deferred result is resolved exactly once.
    pub fn resolve(self, result: Result<V>) {
        // A send error means every receiver is gone; nobody is waiting.
        let _ = self.tx.send(Some(result));
    }
}

impl<V> Deferred<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an unresolved deferred together with its resolver.
    pub fn new() -> (Self, Resolver<V>) {
        let (tx, rx) = watch::channel(None);
        (Self { rx }, Resolver { tx })
    }

    /// Creates a deferred that is already resolved with `result`.
    pub fn resolved(result: Result<V>) -> Self {
        let (tx, rx) = watch::channel(Some(result));
        drop(tx);
        Self { rx }
    }

    /// Creates a deferred already resolved over a value.
    pub fn value(value: V) -> Self {
        Self::resolved(Ok(value))
    }

    /// Creates a deferred already resolved over an error.
    pub fn error(error: LoadError) -> Self {
        Self::resolved(Err(error))
    }

    /// Runs `future` on its own task and resolves with its output.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<V>> + Send + 'static,
    {
        let (deferred, resolver) = Self::new();
        tokio::spawn(async move {
            resolver.resolve(future.await);
        });
        deferred
    }

    /// Suspends until the result is produced, then returns it.
    ///
    /// Returns immediately on an already-resolved deferred. A resolver
    /// dropped without resolving surfaces as [`LoadError::Internal`]
    /// rather than hanging the waiter.
    pub async fn wait(&self) -> Result<V> {
        let mut rx = self.rx.clone();
        match rx.wait_for(Option::is_some).await {
            Ok(slot) => (*slot)
                .clone()
                .unwrap_or_else(|| Err(LoadError::internal("deferred slot empty after wakeup"))),
            Err(_) => Err(LoadError::internal(
                "deferred resolver dropped without resolving",
            )),
        }
    }

    /// Whether the result has been produced yet.
    pub fn is_resolved(&self) -> bool {
        self.rx.borrow().is_some()
    }
}
