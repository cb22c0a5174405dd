//! Per-record loader
//!
//! Streams an NDJSON resource file and upserts each line with
//! `PUT {base}/{resourceType}/{id}`.

use crate::client::{FhirClient, describe_failure};
use crate::etl::Sender;
use crate::metrics::Stopwatch;
use crate::storage::NdjsonReader;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::path::Path;

/// Highest status treated as a successful upsert by default
pub const DEFAULT_MAX_OK_STATUS: u16 = 201;

/// Extract the `(resourceType, id)` pair addressing a record
///
/// # Errors
/// Returns an error if either field is missing, empty or not a string.
pub fn record_key(resource: &Value) -> Result<(&str, &str)> {
    let field = |name: &str| {
        resource
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| eyre!("Resource missing '{}' field", name))
    };
    Ok((field("resourceType")?, field("id")?))
}

/// Sender for resource files (`*.ndjson`)
///
/// Records are sent one at a time in file order and the file stops at the
/// first failing record. The file succeeds only if every record does.
pub struct RecordSender {
    client: FhirClient,
    max_ok_status: u16,
}

impl RecordSender {
    pub fn new(client: FhirClient) -> Self {
        Self {
            client,
            max_ok_status: DEFAULT_MAX_OK_STATUS,
        }
    }

    /// Treat statuses above `status` as a failed upsert (default: 201)
    pub fn with_max_ok_status(mut self, status: u16) -> Self {
        self.max_ok_status = status;
        self
    }

    async fn upsert(&self, resource: &Value) -> Result<()> {
        let (resource_type, id) = record_key(resource)?;
        let response = self.client.put_resource(resource_type, id, resource).await?;

        let status = response.status();
        if status.as_u16() > self.max_ok_status {
            let body = response.text().await.unwrap_or_default();
            eyre::bail!(
                "PUT {}/{} returned {}: {} object: {}",
                resource_type,
                id,
                status,
                describe_failure(&body),
                resource
            );
        }
        Ok(())
    }

    async fn send_records(&self, path: &Path, sent: &mut usize) -> Result<()> {
        for record in NdjsonReader::new(path).records()? {
            let (line, resource) = record?;
            self.upsert(&resource)
                .await
                .with_context(|| format!("Line {}", line))?;
            *sent += 1;
        }
        Ok(())
    }
}

impl Sender for RecordSender {
    async fn send(&self, path: &Path) -> Result<usize> {
        log::info!("Loading resources {}", path.display());
        let watch = Stopwatch::start();

        let mut sent = 0;
        let result = self.send_records(path, &mut sent).await;
        let throughput = watch.throughput(sent);

        match result {
            Ok(()) => {
                log::info!("PUT {} {}", path.display(), throughput);
                Ok(sent)
            }
            Err(e) => {
                log::warn!("PUT {} stopped early {}", path.display(), throughput);
                Err(e.wrap_err(format!(
                    "{} failed after {} record(s)",
                    path.display(),
                    sent
                )))
            }
        }
    }
}
