//! # batchload
//!
//! A request-coalescing layer in front of an expensive, possibly I/O-bound
//! "fetch many keys at once" function. Many independent callers load
//! individual keys concurrently while the loader
//!
//! - collapses concurrent duplicate requests for the same key into one
//!   pending result, and
//! - groups concurrently-issued distinct keys into a single batched call
//!   to the underlying fetcher, amortizing per-call overhead.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use batchload::{FetchFn, LoadError, Loader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LoadError> {
//!     // The fetcher sees each batch of keys once, in submission order.
//!     let loader = Loader::new(FetchFn::new(|keys: Vec<u64>| async move {
//!         Ok::<_, LoadError>(
//!             keys.into_iter()
//!                 .map(|key| Ok::<_, LoadError>(key * 2))
//!                 .collect(),
//!         )
//!     }));
//!
//!     // Issued back-to-back: one fetch with [3, 4].
//!     let (a, b) = tokio::join!(loader.load(3), loader.load(4));
//!     assert_eq!(a?, 6);
//!     assert_eq!(b?, 8);
//!     Ok(())
//! }
//! ```
//!
//! Batching, memoization, the cache-key transform, and the memo store are
//! all configurable through [`Loader::builder`]. See [`core::loader`] for
//! the dispatch and error-handling semantics.

#![warn(clippy::all)]

pub mod core;
pub mod utils;

pub use crate::core::deferred::{Deferred, Resolver};
pub use crate::core::fanout::fan_out;
pub use crate::core::fetch::{FetchFn, Fetcher};
pub use crate::core::loader::{Loader, LoaderBuilder};
pub use crate::core::queue::{Pending, PendingQueue};
pub use crate::core::store::{InMemoryStore, MemoStore};
pub use crate::utils::error::{LoadError, Result};
