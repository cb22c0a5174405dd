//! CLI helper functions

use crate::{
    client::{Auth, FhirClient},
    etl::{Dispatcher, Extractor, RunSummary, Sender},
    fhir::{BundleSender, RecordSender, ResourceExtractor},
    metrics::Stopwatch,
    storage::{ResourceFanout, list_files},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Load credentials from environment variables
///
/// Expected environment variables:
/// - FHIR_TOKEN: Bearer token (optional, wins over basic auth)
/// - FHIR_USERNAME: Username for basic auth (optional)
/// - FHIR_PASSWORD: Password for basic auth (optional)
pub fn load_auth() -> Auth {
    Auth::new(
        std::env::var("FHIR_TOKEN").ok(),
        std::env::var("FHIR_USERNAME").ok(),
        std::env::var("FHIR_PASSWORD").ok(),
    )
}

/// Build a FHIR client for `url` with credentials from the environment
pub fn load_fhir_client(url: &str, timeout: Option<Duration>) -> Result<FhirClient> {
    let url = Url::parse(url).with_context(|| format!("Invalid FHIR URL: {}", url))?;
    let auth = load_auth();
    log::debug!("Using {} auth for {}", auth, url);
    FhirClient::try_new(url, auth, timeout).context("Failed to create FHIR client")
}

/// Settings shared by both load commands
#[derive(Clone, Debug)]
pub struct LoadOptions {
    pub url: String,
    pub chunk_size: NonZeroUsize,
    pub limit: Option<usize>,
    pub timeout: Option<Duration>,
}

/// Extract resources from the server into per-kind NDJSON files
///
/// Pipeline: ResourceExtractor → ResourceFanout
pub async fn extract_resources(
    extract_path: impl AsRef<Path>,
    url_base: &str,
    url_path: &str,
) -> Result<usize> {
    let extract_path = extract_path.as_ref();
    let client = load_fhir_client(url_base, None)?;
    let url = client.join(url_path)?;

    let watch = Stopwatch::start();
    let extractor = ResourceExtractor::new(client, url_path);
    let resources = extractor.extract().await?;

    let mut fanout = ResourceFanout::new(extract_path);
    for resource in &resources {
        fanout.write(resource)?;
    }
    let counts = fanout.finish()?;

    let throughput = watch.throughput(resources.len());
    if resources.is_empty() {
        log::info!(
            "GET {} seconds:{:.4} returned no resources",
            url.bright_black(),
            throughput.seconds()
        );
    } else {
        log::info!("GET {} {}", url.bright_black(), throughput);
    }
    for (kind, count) in &counts {
        log::debug!(
            "Wrote {} {} to {}",
            count,
            kind,
            extract_path.join(format!("{}.ndjson", kind)).display()
        );
    }

    Ok(resources.len())
}

/// Load every `*.json` bundle in `input_path`
pub async fn load_bundles(
    input_path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<RunSummary> {
    let paths = list_files(input_path, "json")?;
    let client = load_fhir_client(&options.url, options.timeout)?;
    Ok(dispatch(BundleSender::new(client), &paths, options).await)
}

/// Load every `*.ndjson` resource file in `input_path`
pub async fn load_resources(
    input_path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<RunSummary> {
    let paths = list_files(input_path, "ndjson")?;
    let client = load_fhir_client(&options.url, options.timeout)?;
    Ok(dispatch(RecordSender::new(client), &paths, options).await)
}

async fn dispatch<S: Sender + 'static>(
    sender: S,
    paths: &[PathBuf],
    options: &LoadOptions,
) -> RunSummary {
    log::info!(
        "Loading {} file(s) to {} in chunks of {}",
        paths.len(),
        options.url.bright_black(),
        options.chunk_size
    );

    let dispatcher = Dispatcher::new(sender, options.chunk_size).with_limit(options.limit);
    let summary = dispatcher.run(paths).await;

    let rate = match summary.elapsed.as_secs_f64() {
        seconds if seconds > 0.0 => summary.dispatched as f64 / seconds,
        _ => 0.0,
    };
    log::info!("{} rate:{:.2} files/sec", summary, rate);
    summary
}

/// Report a finished load run, failing when any file failed
pub fn finish(input_path: &Path, summary: &RunSummary) -> Result<()> {
    if summary.is_success() {
        log::info!("{} {}", "✓ done".green(), input_path.display());
        Ok(())
    } else {
        log::error!("{} {}", "✗ failed".red(), input_path.display());
        eyre::bail!(
            "{} of {} file(s) failed to load from {}",
            summary.failed,
            summary.dispatched,
            input_path.display()
        )
    }
}
