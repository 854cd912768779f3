//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier and dispatching fetches under the scheduler's limits
//! - Routing each fetch outcome to the response or error classifier
//! - Feeding discovered links back into the frontier
//! - Handling cancellation and draining in-flight fetches
//! - Finalizing the output sinks

use crate::config::{Config, CrawlSettings};
use crate::crawler::classify::{classify_failure, classify_response, Classification};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::scheduler::{ScheduledFetch, Scheduler};
use crate::crawler::task::FetchTask;
use crate::crawler::transport::{FetchResponse, ReqwestTransport, Transport, TransportError};
use crate::output::{LinkRecord, RecordEmitter, RunStats};
use crate::state::TaskState;
use crate::storage::RunStatus;
use crate::CheckerError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

/// Progress is logged every this many dispatches
const PROGRESS_INTERVAL: u64 = 25;

/// How a dispatched fetch ended
#[derive(Debug)]
pub enum FetchOutcome {
    /// The transport returned a response, whatever its status
    Completed {
        task: FetchTask,
        response: FetchResponse,
    },

    /// No response was obtained
    Failed {
        task: FetchTask,
        error: TransportError,
    },
}

/// Result of a finished (or interrupted) run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub status: RunStatus,
    pub stats: RunStats,

    /// Every emitted record in completion order
    pub records: Vec<LinkRecord>,

    pub elapsed: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    settings: CrawlSettings,
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn LinkExtractor>,
}

impl Coordinator {
    /// Creates a coordinator from explicit collaborators
    ///
    /// # Arguments
    ///
    /// * `settings` - The run configuration
    /// * `transport` - Performs the fetches
    /// * `extractor` - Finds anchors in HTML bodies
    pub fn new(
        settings: CrawlSettings,
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            settings,
            transport,
            extractor,
        }
    }

    /// Creates a coordinator with the reqwest transport and scraper extractor
    ///
    /// # Errors
    ///
    /// `CheckerError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, CheckerError> {
        Ok(Self::new(
            config.crawl_settings(),
            Arc::new(ReqwestTransport::from_config(config)?),
            Arc::new(HtmlLinkExtractor::new()),
        ))
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// Every record goes through `emitter`; the sinks are finalized before
    /// this returns, also when the run was cancelled or aborted by an
    /// internal fault. Only setup problems (bad seed, bad deny pattern) and
    /// internal faults return `Err`.
    pub async fn run(
        self,
        cancel: CancellationToken,
        mut emitter: RecordEmitter,
    ) -> Result<CrawlReport, CheckerError> {
        let start_time = Instant::now();
        let mut scheduler = Scheduler::new(&self.settings)?;
        let seed = Url::parse(self.settings.seed_url.trim())?;

        info!(
            "Starting crawl at {} (authority {}, concurrency {}, delay {:?})",
            seed,
            scheduler.seed_authority(),
            self.settings.max_concurrency,
            self.settings.dispatch_delay
        );

        let stopped = match self.drive(seed, &cancel, &mut scheduler, &mut emitter).await {
            Ok(stopped) => stopped,
            Err(e) => {
                error!("Crawl aborted: {}", e);
                let stats = scheduler.into_stats();
                emitter.finish(RunStatus::Failed, &stats);
                return Err(e);
            }
        };

        let status = if stopped {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };
        let stats = scheduler.into_stats();
        let records = emitter.finish(status, &stats);
        let elapsed = start_time.elapsed();

        info!(
            "Crawl {}: {} fetches, {} records in {:?}",
            status,
            stats.dispatched,
            records.len(),
            elapsed
        );

        Ok(CrawlReport {
            status,
            stats,
            records,
            elapsed,
        })
    }

    /// The dispatch loop; returns true if it ended through cancellation
    ///
    /// Fetches still in flight when this returns `Err` are aborted.
    async fn drive(
        &self,
        seed: Url,
        cancel: &CancellationToken,
        scheduler: &mut Scheduler,
        emitter: &mut RecordEmitter,
    ) -> Result<bool, CheckerError> {
        scheduler.enqueue(FetchTask::seed(seed))?;

        let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();
        let mut stopping = false;

        loop {
            if in_flight.is_empty() && (stopping || !scheduler.has_pending()) {
                break;
            }

            let can_dispatch = !stopping && scheduler.has_pending() && scheduler.has_capacity();
            let deadline = scheduler.next_dispatch_deadline();

            tokio::select! {
                biased;

                _ = cancel.cancelled(), if !stopping => {
                    let dropped = scheduler.clear_frontier();
                    warn!(
                        "Crawl cancelled: dropping {} queued tasks, draining {} in flight",
                        dropped,
                        in_flight.len()
                    );
                    stopping = true;
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    let outcome = joined?;
                    self.handle_outcome(outcome, scheduler, emitter)?;
                }

                _ = tokio::time::sleep_until(deadline), if can_dispatch => {
                    if let Some(fetch) = scheduler.dispatch_next()? {
                        self.spawn_fetch(&mut in_flight, fetch);

                        let dispatched = scheduler.stats().dispatched;
                        if dispatched % PROGRESS_INTERVAL == 0 {
                            info!(
                                "Progress: {} dispatched, {} in frontier, {} in flight, {} records",
                                dispatched,
                                scheduler.frontier_size(),
                                in_flight.len(),
                                emitter.len()
                            );
                        }
                    }
                }

                else => break,
            }
        }

        Ok(stopping)
    }

    fn spawn_fetch(&self, in_flight: &mut JoinSet<FetchOutcome>, fetch: ScheduledFetch) {
        let transport = Arc::clone(&self.transport);
        let timeout = self.settings.request_timeout;

        in_flight.spawn(async move {
            let ScheduledFetch { task, permit } = fetch;

            // Backstop for transports that ignore their timeout
            let result = match tokio::time::timeout(timeout, transport.fetch(&task.url, timeout)).await
            {
                Ok(result) => result,
                Err(_) => Err(TransportError::timeout(format!(
                    "no response from {} within {:?}",
                    task.url, timeout
                ))),
            };
            drop(permit);

            match result {
                Ok(response) => FetchOutcome::Completed { task, response },
                Err(error) => FetchOutcome::Failed { task, error },
            }
        });
    }

    fn handle_outcome(
        &self,
        outcome: FetchOutcome,
        scheduler: &mut Scheduler,
        emitter: &mut RecordEmitter,
    ) -> Result<(), CheckerError> {
        match outcome {
            FetchOutcome::Completed { mut task, response } => {
                task.advance(TaskState::Completed)?;
                scheduler.stats_mut().completed += 1;
                debug!("{} answered {}", task.url, response.status);

                match classify_response(&task, &response, &self.settings.reportable_statuses) {
                    Classification::Record(record) => {
                        emit(scheduler, emitter, record);
                    }
                    Classification::ExtractLinks => {
                        let body = response.body.as_deref().unwrap_or_default();
                        let anchors = self.extractor.extract_anchors(body, &response.final_url);
                        let queued = scheduler.discover_links(&response.final_url, &anchors)?;
                        debug!(
                            "{}: {} anchors, {} queued",
                            response.final_url,
                            anchors.len(),
                            queued
                        );
                    }
                    Classification::Reachable => {
                        debug!("External {} reachable, not followed", task.url);
                    }
                }
            }

            FetchOutcome::Failed { mut task, error } => {
                task.advance(TaskState::Failed)?;
                scheduler.stats_mut().failed += 1;
                debug!("{} failed: {}", task.url, error);

                emit(scheduler, emitter, classify_failure(&task, &error));
            }
        }

        Ok(())
    }
}

fn emit(scheduler: &mut Scheduler, emitter: &mut RecordEmitter, record: LinkRecord) {
    scheduler.stats_mut().record_emitted(&record);
    emitter.emit(record);
}
