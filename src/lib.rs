//! FHIR Loader
//!
//! Moves FHIR resources between local files and a FHIR server: extraction
//! fans a fetched bundle out into per-kind NDJSON files, loading pushes
//! bundle or NDJSON files to the server in concurrent chunks.

pub mod cli;
pub mod client;
pub mod etl;
pub mod fhir;
pub mod metrics;
pub mod storage;
pub mod transform;

// Re-exports for convenience
pub use client::{Auth, FhirClient};
pub use etl::{Dispatcher, Extractor, RunSummary, Sender, Transformer};
pub use fhir::{BundleSender, RecordSender, ResourceExtractor};
pub use storage::{NdjsonReader, ResourceFanout};
