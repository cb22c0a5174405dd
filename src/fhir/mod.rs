//! FHIR-specific extractors and senders
//!
//! - [`ResourceExtractor`]: GET a resource or bundle from the server
//! - [`BundleSender`]: POST whole bundle files
//! - [`RecordSender`]: PUT NDJSON records one by one

mod bundle_sender;
mod extractor;
mod record_sender;

pub use bundle_sender::{BundleSender, PreparedBundle};
pub use extractor::{ResourceExtractor, resources_from_document};
pub use record_sender::{DEFAULT_MAX_OK_STATUS, RecordSender, record_key};
