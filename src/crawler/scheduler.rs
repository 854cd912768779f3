//! Scheduler for managing the crawl frontier and dispatch pacing
//!
//! This module handles:
//! - The FIFO frontier of queued fetch tasks
//! - The visited set enforcing at-most-once dispatch per normalized URL
//! - Global concurrency limiting via a semaphore
//! - The minimum delay between two dispatches
//!
//! The scheduler is owned by the coordinator loop and never shared, so the
//! visited check-and-insert cannot race.

use crate::config::{validate_seed_url, CrawlSettings};
use crate::crawler::discovery::{discover, Discovery};
use crate::crawler::parser::Anchor;
use crate::crawler::task::FetchTask;
use crate::output::RunStats;
use crate::state::TaskState;
use crate::url::{normalize_url, Authority, DenyList};
use crate::CheckerError;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::{debug, trace};
use url::Url;

/// A dispatched task with the concurrency permit it holds while in flight
pub struct ScheduledFetch {
    pub task: FetchTask,

    /// Released when the fetch finishes
    pub permit: OwnedSemaphorePermit,
}

/// Per-run traversal state
pub struct Scheduler {
    /// Authority of the seed; fixed for the run
    seed_authority: Authority,

    deny: DenyList,

    /// Normalized URLs already dispatched
    visited: HashSet<String>,

    frontier: VecDeque<FetchTask>,

    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    dispatch_delay: Duration,

    last_dispatch: Option<Instant>,

    stats: RunStats,
}

impl Scheduler {
    /// Creates a scheduler for the given settings
    ///
    /// # Errors
    ///
    /// Fails when the seed URL is unusable or a deny pattern does not compile.
    pub fn new(settings: &CrawlSettings) -> Result<Self, CheckerError> {
        validate_seed_url(&settings.seed_url)?;
        let seed_authority = Authority::parse(&settings.seed_url)?;
        let deny = DenyList::new(&settings.deny_patterns)?;

        Ok(Self {
            seed_authority,
            deny,
            visited: HashSet::new(),
            frontier: VecDeque::new(),
            semaphore: Arc::new(Semaphore::new(settings.max_concurrency.max(1))),
            dispatch_delay: settings.dispatch_delay,
            last_dispatch: None,
            stats: RunStats::new(),
        })
    }

    pub fn seed_authority(&self) -> &Authority {
        &self.seed_authority
    }

    /// Offers a task to the frontier
    ///
    /// A task whose URL was already dispatched is discarded on the spot.
    /// Returns true if the task was queued.
    pub fn enqueue(&mut self, mut task: FetchTask) -> Result<bool, CheckerError> {
        if self.visited.contains(&normalize_url(&task.url)) {
            self.discard(&mut task)?;
            return Ok(false);
        }

        trace!("Queued {} ({})", task.url, task.scope.as_str());
        self.frontier.push_back(task);
        Ok(true)
    }

    /// Runs link discovery over the anchors of a page and queues the results
    ///
    /// Returns the number of tasks queued.
    pub fn discover_links(&mut self, page_url: &Url, anchors: &[Anchor]) -> Result<usize, CheckerError> {
        let mut queued = 0;

        for anchor in anchors {
            match discover(anchor, page_url, &self.seed_authority, &self.deny) {
                Discovery::Candidate(task) => {
                    if self.enqueue(task)? {
                        queued += 1;
                    }
                }
                Discovery::Rejected => {
                    trace!("Skipping unusable href '{}' on {}", anchor.href, page_url);
                    self.stats.rejected += 1;
                }
                Discovery::Denied(url) => {
                    debug!("Skipping denied link {} on {}", url, page_url);
                    self.stats.denied += 1;
                }
            }
        }

        Ok(queued)
    }

    /// Earliest instant the next dispatch may happen
    pub fn next_dispatch_deadline(&self) -> Instant {
        match self.last_dispatch {
            Some(last) => last + self.dispatch_delay,
            None => Instant::now(),
        }
    }

    /// Returns true if a concurrency permit is free
    pub fn has_capacity(&self) -> bool {
        self.semaphore.available_permits() > 0
    }

    /// Pops the next dispatchable task and marks its URL visited
    ///
    /// Already-visited tasks at the head of the frontier are discarded.
    /// Returns `None` when the frontier is exhausted or no permit is free.
    pub fn dispatch_next(&mut self) -> Result<Option<ScheduledFetch>, CheckerError> {
        while let Some(mut task) = self.frontier.pop_front() {
            let key = normalize_url(&task.url);
            if self.visited.contains(&key) {
                self.discard(&mut task)?;
                continue;
            }

            let permit = match self.semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    self.frontier.push_front(task);
                    return Ok(None);
                }
            };

            task.advance(TaskState::InFlight)?;
            self.visited.insert(key);
            self.last_dispatch = Some(Instant::now());
            self.stats.dispatched += 1;

            debug!("Dispatching {} ({})", task.url, task.scope.as_str());
            return Ok(Some(ScheduledFetch { task, permit }));
        }

        Ok(None)
    }

    fn discard(&mut self, task: &mut FetchTask) -> Result<(), CheckerError> {
        task.advance(TaskState::Discarded)?;
        self.stats.discarded += 1;
        trace!("Discarded duplicate {}", task.url);
        Ok(())
    }

    /// Returns the number of tasks in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.frontier.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&normalize_url(url))
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut RunStats {
        &mut self.stats
    }

    /// Drops any queued work; used when the run is cancelled
    pub fn clear_frontier(&mut self) -> usize {
        let dropped = self.frontier.len();
        self.frontier.clear();
        dropped
    }

    pub fn into_stats(self) -> RunStats {
        self.stats
    }
}
