//! Parallel multi-key fan-out
//!
//! Launches one task per key, collects `(index, result)` pairs as they
//! complete, and returns the values in original key order once all arrive.
//! The first error short-circuits the whole call; the remaining in-flight
//! tasks are not cancelled, they finish detached and their results are
//! discarded.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::debug;

use crate::utils::error::{LoadError, Result};

/// Runs `submit` for every key concurrently and joins the results in
/// input order, or returns the first error observed.
pub async fn fan_out<K, V, F, Fut>(keys: Vec<K>, submit: F) -> Result<Vec<V>>
where
    K: Send + 'static,
    V: Send + 'static,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<V>> + Send + 'static,
{
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let total = keys.len();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for (index, key) in keys.into_iter().enumerate() {
        let tx = tx.clone();
        let submission = submit(key);
        tokio::spawn(async move {
            // The receiver is gone once a sibling errored; nothing to do
            // with a late result then.
            let _ = tx.send((index, submission.await));
        });
    }
    drop(tx);

    let mut slots: Vec<Option<V>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    for _ in 0..total {
        let (index, outcome) = rx
            .recv()
            .await
            .ok_or_else(|| LoadError::internal("fan-out worker dropped its result"))?;
        match outcome {
            Ok(value) => slots[index] = Some(value),
            Err(err) => {
                debug!(index, "fan-out short-circuiting on first error");
                return Err(err);
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.ok_or_else(|| LoadError::internal("fan-out slot left unfilled")))
        .collect()
}
