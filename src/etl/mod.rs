//! Core ETL (Extract, Transform, Load) abstractions
//!
//! This module provides the trait definitions for pulling resources from a
//! source, rewriting them, and pushing files to a destination, plus the
//! chunked dispatcher that drives a [`Sender`] over many files.

mod chunk;
mod dispatch;
mod extract;
mod send;
mod transform;

pub use chunk::chunks;
pub use dispatch::{Dispatcher, RunSummary};
pub use extract::Extractor;
pub use send::Sender;
pub use transform::Transformer;
