//! Error types for the batch loader
//!
//! Every failure surfaces to the original caller as the `Err` half of its
//! load result. Errors are `Clone` because one resolved result may fan out
//! to any number of concurrent waiters, and a negative result may be
//! memoized and replayed to later callers.

use thiserror::Error;

/// Result type alias for the batch loader
pub type Result<T> = std::result::Result<T, LoadError>;

/// Main error type for the batch loader
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A load was submitted without a key; surfaced synchronously, nothing
    /// is enqueued.
    #[error("load requires a key")]
    InvalidKey,

    /// The batch-fetch call itself failed. Every item in that dispatch is
    /// rejected with this error and its memo entry evicted, so the next
    /// submission re-attempts the fetch.
    #[error("batch fetch failed: {0}")]
    Fetch(String),

    /// The batch-fetch call returned a result list whose length differs
    /// from the key list it was given. Handled as a whole-batch failure.
    #[error("batch fetch returned {returned} results for {expected} keys")]
    BatchShape {
        /// Number of keys passed to the fetcher
        expected: usize,
        /// Number of results it returned
        returned: usize,
    },

    /// Invariant violation inside the loader itself, e.g. a resolver
    /// dropped without resolving. Propagated instead of panicking.
    #[error("internal loader error: {0}")]
    Internal(String),
}

impl LoadError {
    /// Shorthand for a fetch failure, for fetcher implementations.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
