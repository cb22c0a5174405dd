//! File system storage operations
//!
//! This module handles all local file I/O:
//! - Listing load inputs in a directory
//! - Streaming NDJSON records
//! - Fanning extracted resources out into per-kind NDJSON files

mod directory;
mod ndjson;

pub use directory::list_files;
pub use ndjson::{NdjsonReader, NdjsonRecords, ResourceFanout};
