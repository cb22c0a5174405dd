//! FHIR client module
//!
//! Provides `FhirClient` for making REST requests to a FHIR server.
//! Uploads carry the FHIR JSON content type and the header that disables the
//! server-side upsert existence check. Reads carry only the credentials.

use super::Auth;
use eyre::{Context, Result, eyre};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Media type for FHIR JSON resources and bundles
pub const FHIR_JSON: &str = "application/fhir+json;charset=utf-8";

/// Vendor header turning off the existence check on client-assigned ids.
///
/// Spelled the way the server reads it. Only safe when duplicate detection is
/// not required.
pub const UPSERT_CHECK_HEADER: &str = "x-upsert-extistence-check";

/// FHIR client for making REST requests.
///
/// Cloning is cheap and clones share one connection pool.
///
/// # Example
/// ```no_run
/// use fhir_loader::client::{Auth, FhirClient};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("http://localhost:8090/fhir")?;
/// let client = FhirClient::try_new(url, Auth::None, None)?;
///
/// let capabilities = client.get("metadata").await?;
/// assert!(capabilities.status().is_success());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FhirClient {
    client: Client,
    url: Url,
}

impl FhirClient {
    /// Create a new FhirClient from a base URL, Auth and optional request timeout.
    ///
    /// # Errors
    /// Returns an error if a header value is invalid or the HTTP client
    /// cannot be built
    pub fn try_new(url: Url, auth: Auth, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(value) = auth.header_value() {
            let mut value: HeaderValue = value.parse()?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, url })
    }

    fn upload_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON));
        headers.insert(
            HeaderName::from_static(UPSERT_CHECK_HEADER),
            HeaderValue::from_static("disabled"),
        );
        headers
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `{base}/{path}`, keeping any query string in `path`
    pub fn join(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).with_context(|| format!("Invalid URL: {}", joined))
    }

    /// `{base}/{resource_type}/{id}` with each segment percent-encoded
    pub fn resource_url(&self, resource_type: &str, id: &str) -> Result<Url> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| eyre!("Base URL cannot have path segments: {}", self.url))?
            .pop_if_empty()
            .push(resource_type)
            .push(id);
        Ok(url)
    }

    /// GET `{base}/{path}`
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.join(path)?;
        log::trace!("GET {}", url);
        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request: GET {}", url))
    }

    /// POST a raw bundle document to the base URL
    pub async fn post_bundle(&self, body: Vec<u8>) -> Result<Response> {
        log::trace!("POST {} ({} bytes)", self.url, body.len());
        self.client
            .post(self.url.clone())
            .headers(Self::upload_headers())
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request: POST {}", self.url))
    }

    /// PUT one resource to `{base}/{resource_type}/{id}`
    pub async fn put_resource(
        &self,
        resource_type: &str,
        id: &str,
        resource: &Value,
    ) -> Result<Response> {
        let url = self.resource_url(resource_type, id)?;
        let body = serde_json::to_vec(resource)?;
        log::trace!("PUT {}", url);
        self.client
            .put(url.clone())
            .headers(Self::upload_headers())
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request: PUT {}", url))
    }
}

impl std::fmt::Display for FhirClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationOutcome {
    resource_type: String,
    #[serde(default)]
    issue: Vec<Issue>,
}

#[derive(Deserialize)]
struct Issue {
    severity: Option<String>,
    code: Option<String>,
    diagnostics: Option<String>,
}

/// Summarise an error response body for a log line
///
/// OperationOutcome issues are condensed to `severity/code: diagnostics`;
/// anything else is returned as-is.
pub fn describe_failure(body: &str) -> String {
    match serde_json::from_str::<OperationOutcome>(body) {
        Ok(outcome) if outcome.resource_type == "OperationOutcome" && !outcome.issue.is_empty() => {
            outcome
                .issue
                .iter()
                .map(|issue| {
                    format!(
                        "{}/{}: {}",
                        issue.severity.as_deref().unwrap_or("error"),
                        issue.code.as_deref().unwrap_or("unknown"),
                        issue.diagnostics.as_deref().unwrap_or("no diagnostics")
                    )
                })
                .collect::<Vec<_>>()
                .join("; ")
        }
        _ => body.to_string(),
    }
}
