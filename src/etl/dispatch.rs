//! Chunked, concurrent dispatch of files to a [`Sender`]
//!
//! Each chunk of paths is spawned onto a [`JoinSet`] all at once and fully
//! drained before the next chunk starts. Every task result, including panics,
//! is folded into a boolean outcome at the join point, so one bad file never
//! aborts its siblings or the run.

use super::{Sender, chunk::chunks};
use crate::metrics::Stopwatch;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Aggregate result of one dispatch run
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Logical AND of every task outcome across every chunk
    pub ok: bool,
    /// Files handed to the sender
    pub dispatched: usize,
    /// Files whose task failed
    pub failed: usize,
    /// Items accepted from files that loaded successfully
    pub items: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            ok: true,
            dispatched: 0,
            failed: 0,
            items: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.ok
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files:{} failed:{} items:{} seconds:{:.4}",
            self.dispatched,
            self.failed,
            self.items,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Runs a [`Sender`] over a list of files, `chunk_size` files at a time
///
/// # Example
/// ```no_run
/// use fhir_loader::etl::Dispatcher;
/// use fhir_loader::fhir::BundleSender;
/// use fhir_loader::client::{Auth, FhirClient};
/// use std::num::NonZeroUsize;
/// use std::path::PathBuf;
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = FhirClient::try_new(Url::parse("http://localhost:8090/fhir")?, Auth::None, None)?;
/// let dispatcher = Dispatcher::new(BundleSender::new(client), NonZeroUsize::new(5).unwrap());
///
/// let paths: Vec<PathBuf> = vec!["a.json".into(), "b.json".into()];
/// let summary = dispatcher.run(&paths).await;
/// assert!(summary.is_success());
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher<S> {
    sender: Arc<S>,
    chunk_size: NonZeroUsize,
    limit: Option<usize>,
}

impl<S: Sender + 'static> Dispatcher<S> {
    pub fn new(sender: S, chunk_size: NonZeroUsize) -> Self {
        Self {
            sender: Arc::new(sender),
            chunk_size,
            limit: None,
        }
    }

    /// Stop launching tasks once `limit` files have been dispatched
    ///
    /// Already-started tasks of the current chunk still run to completion.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn limit_reached(&self, dispatched: usize) -> bool {
        self.limit.is_some_and(|limit| dispatched >= limit)
    }

    /// Dispatch every path and report the cumulative outcome
    pub async fn run(&self, paths: &[PathBuf]) -> RunSummary {
        let watch = Stopwatch::start();
        let mut summary = RunSummary::new();

        log::debug!(
            "Dispatching {} file(s) in chunks of {}",
            paths.len(),
            self.chunk_size
        );

        for (index, chunk) in chunks(paths, self.chunk_size).enumerate() {
            let mut tasks = JoinSet::new();

            for path in chunk {
                if self.limit_reached(summary.dispatched) {
                    break;
                }
                let sender = Arc::clone(&self.sender);
                let path = path.clone();
                tasks.spawn(async move {
                    let result = sender.send(&path).await;
                    (path, result)
                });
                summary.dispatched += 1;
            }

            let chunk_ok = drain(&mut tasks, &mut summary).await;
            log::debug!("Chunk {} finished, ok: {}", index, chunk_ok);
            summary.ok &= chunk_ok;

            if self.limit_reached(summary.dispatched) {
                log::info!("Reached limit of {} file(s)", summary.dispatched);
                break;
            }
        }

        summary.elapsed = watch.elapsed();
        summary
    }
}

/// Wait for every task in the chunk, in completion order
async fn drain(
    tasks: &mut JoinSet<(PathBuf, eyre::Result<usize>)>,
    summary: &mut RunSummary,
) -> bool {
    let mut ok = true;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((path, Ok(count))) => {
                log::trace!("{} sent {} item(s)", path.display(), count);
                summary.items += count;
            }
            Ok((path, Err(e))) => {
                log::error!("Failed to load {}: {:#}", path.display(), e);
                summary.failed += 1;
                ok = false;
            }
            Err(e) => {
                log::error!("Load task did not complete: {}", e);
                summary.failed += 1;
                ok = false;
            }
        }
    }
    ok
}
