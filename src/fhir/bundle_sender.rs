//! Whole-bundle loader
//!
//! Uploads one bundle file per request via POST to the server base URL.

use crate::client::{FhirClient, describe_failure};
use crate::etl::{Sender, Transformer};
use crate::metrics::Stopwatch;
use crate::transform::{RewrittenBundle, UpsertRewriter};
use eyre::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::path::Path;

/// Request body ready to be posted
#[derive(Debug)]
pub struct PreparedBundle {
    pub body: Vec<u8>,
    /// Number of entries in the bundle
    pub entries: usize,
    /// Entries turned from create into update
    pub rewritten: usize,
}

/// Sender for bundle files (`*.json`)
///
/// The file is read once. When no entry needs the create-to-update rewrite
/// the raw bytes are forwarded verbatim, otherwise the rewritten bundle is
/// serialized with its key order and decimal literals intact. Only `200 OK`
/// counts as success.
///
/// # Example
/// ```no_run
/// use fhir_loader::client::{Auth, FhirClient};
/// use fhir_loader::etl::Sender;
/// use fhir_loader::fhir::BundleSender;
/// use std::path::Path;
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = FhirClient::try_new(Url::parse("http://localhost:8090/fhir")?, Auth::None, None)?;
/// let sender = BundleSender::new(client);
/// let entries = sender.send(Path::new("data/input/bundles/patient.json")).await?;
/// # Ok(())
/// # }
/// ```
pub struct BundleSender {
    client: FhirClient,
    rewriter: UpsertRewriter,
}

impl BundleSender {
    pub fn new(client: FhirClient) -> Self {
        Self {
            client,
            rewriter: UpsertRewriter,
        }
    }

    /// Apply the upsert rewrite to a raw bundle document
    ///
    /// # Errors
    /// Returns an error if the content is not a JSON document.
    pub fn prepare(&self, raw: Vec<u8>) -> Result<PreparedBundle> {
        let bundle: Value =
            serde_json::from_slice(&raw).with_context(|| "Bundle is not valid JSON")?;
        let entries = bundle
            .get("entry")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        let RewrittenBundle { bundle, rewritten } = self.rewriter.transform(bundle)?;
        let body = if rewritten == 0 {
            raw
        } else {
            serde_json::to_vec(&bundle)?
        };

        Ok(PreparedBundle {
            body,
            entries,
            rewritten,
        })
    }
}

impl Sender for BundleSender {
    async fn send(&self, path: &Path) -> Result<usize> {
        log::info!("Loading bundle {}", path.display());
        let watch = Stopwatch::start();

        let raw = std::fs::read(path)
            .with_context(|| format!("Failed to read bundle: {}", path.display()))?;
        let prepared = self
            .prepare(raw)
            .with_context(|| format!("Failed to prepare bundle: {}", path.display()))?;
        if prepared.rewritten > 0 {
            log::debug!(
                "Rewrote {} create(s) to update in {}",
                prepared.rewritten,
                path.display()
            );
        }

        let response = self.client.post_bundle(prepared.body).await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            eyre::bail!(
                "POST {} returned {}: {}",
                self.client.url(),
                status,
                describe_failure(&body)
            );
        }

        log::info!(
            "POST {} seconds:{:.4}",
            path.display(),
            watch.elapsed().as_secs_f64()
        );
        Ok(prepared.entries)
    }
}
