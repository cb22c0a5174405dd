//! Resource extractor
//!
//! Reads one resource or search bundle from a FHIR server via GET.

use crate::client::{FhirClient, describe_failure};
use crate::etl::Extractor;
use eyre::{Context, Result};
use serde_json::Value;

/// Extractor for FHIR resources
///
/// Fetches `{base}/{path}`. A Bundle yields the resource of every entry, any
/// other typed document yields itself.
///
/// # Example
/// ```no_run
/// use fhir_loader::client::{Auth, FhirClient};
/// use fhir_loader::etl::Extractor;
/// use fhir_loader::fhir::ResourceExtractor;
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = FhirClient::try_new(Url::parse("http://localhost:8090/fhir")?, Auth::None, None)?;
/// let extractor = ResourceExtractor::new(client, "Questionnaire");
/// let resources = extractor.extract().await?;
/// # Ok(())
/// # }
/// ```
pub struct ResourceExtractor {
    client: FhirClient,
    path: String,
}

impl ResourceExtractor {
    /// Create a new resource extractor
    ///
    /// # Arguments
    /// * `client` - FHIR HTTP client
    /// * `path` - Path below the base URL: `[type]/[id]`, optionally with a query
    pub fn new(client: FhirClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
        }
    }
}

/// Flatten a fetched document into the resources it carries
pub fn resources_from_document(document: Value) -> Vec<Value> {
    let is_bundle = match document.get("resourceType") {
        Some(Value::String(kind)) => kind == "Bundle",
        _ => return Vec::new(),
    };
    if !is_bundle {
        return vec![document];
    }

    match document {
        Value::Object(mut bundle) => match bundle.remove("entry") {
            Some(Value::Array(entries)) => entries
                .into_iter()
                .filter_map(|mut entry| entry.get_mut("resource").map(Value::take))
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

impl Extractor for ResourceExtractor {
    type Item = Value;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let response = self
            .client
            .get(&self.path)
            .await
            .with_context(|| format!("Failed to fetch {}", self.path))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!(
                "GET {} returned {}: {}",
                self.path,
                status,
                describe_failure(&body)
            );
        }

        let document: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", self.path))?;
        Ok(resources_from_document(document))
    }
}
