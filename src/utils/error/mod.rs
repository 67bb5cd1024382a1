//! Error handling for the batch loader

pub mod error;

pub use error::{LoadError, Result};
