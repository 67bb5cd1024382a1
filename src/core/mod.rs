//! Core loader machinery
//!
//! Leaf-first: the deferred result primitive, the pending queue, the memo
//! store and fetcher contracts, then the orchestrating loader and the
//! fan-out helper built on top of it.

pub mod deferred;
pub mod fanout;
pub mod fetch;
pub mod loader;
pub mod queue;
pub mod store;
