//! Sender trait for pushing one local file to a destination

use eyre::Result;
use std::path::Path;

/// Sender trait for uploading the contents of one file
///
/// A sender owns everything it needs to reach the destination (client, base
/// URL, policy), so the dispatcher only hands it a path. Implementors:
/// - [`BundleSender`](crate::fhir::BundleSender): one request per file
/// - [`RecordSender`](crate::fhir::RecordSender): one request per NDJSON line
///
/// # Example
/// ```no_run
/// use fhir_loader::etl::Sender;
/// use eyre::Result;
/// use std::path::Path;
///
/// struct LineCounter;
///
/// impl Sender for LineCounter {
///     async fn send(&self, path: &Path) -> Result<usize> {
///         Ok(std::fs::read_to_string(path)?.lines().count())
///     }
/// }
/// ```
pub trait Sender: Send + Sync {
    /// Upload the file at `path`
    ///
    /// Returns the number of items the destination accepted.
    ///
    /// # Errors
    /// Any transport error, rejected status or malformed input fails the
    /// whole file.
    fn send(&self, path: &Path) -> impl std::future::Future<Output = Result<usize>> + Send;
}
