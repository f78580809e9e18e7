//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first traversal loop:
//! - Seeding the frontier and pre-registering seed hosts
//! - Fetching one frontier entry after another until the budget runs out
//! - Recording latencies and following newly discovered links
//! - Optionally running fetches on a bounded pool of tasks
//! - Saving fetched pages and writing the final latency report

use crate::config::{Config, CrawlerConfig};
use crate::crawler::extractor::PageLinks;
use crate::crawler::fetcher::{FailureKind, FetchError, FetchResult, PageFetcher, TcpFetcher};
use crate::crawler::scheduler::Scheduler;
use crate::output::{save_page, write_report, CrawlSummary, TerminationReason};
use crate::state::{CrawlPhase, CrawlState, HostRecord};
use crate::url::{split_address, Address};
use crate::CrawlError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{self, JoinSet};

/// Frontier entries whose fetch task is still running, by task id
type InFlight = HashMap<task::Id, (String, Address)>;

/// Everything a drained run leaves behind
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Final frontier and host records
    pub state: CrawlState,

    /// Counters collected during the run
    pub summary: CrawlSummary,
}

/// Main crawler coordinator structure
///
/// The coordinator is the only owner of the [`CrawlState`] for a run. In pool
/// mode fetch tasks never touch it; the coordinator joins them and applies
/// their results, including tasks that panicked.
pub struct Coordinator<F: PageFetcher> {
    config: CrawlerConfig,
    fetcher: Arc<F>,
    state: CrawlState,
    scheduler: Scheduler,
    phase: CrawlPhase,
    summary: CrawlSummary,
    pages_dir: Option<PathBuf>,
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates an idle coordinator with an empty frontier
    pub fn new(config: CrawlerConfig, fetcher: F) -> Self {
        let state = CrawlState::new(config.dedup_key);
        let scheduler = Scheduler::new(config.max_concurrent_fetches as usize);
        let summary = CrawlSummary::new(config.page_budget);

        Self {
            config,
            fetcher: Arc::new(fetcher),
            state,
            scheduler,
            phase: CrawlPhase::Idle,
            summary,
            pages_dir: None,
        }
    }

    /// Saves every fetched page into `dir`
    pub fn with_pages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pages_dir = Some(dir.into());
        self
    }

    /// Queues the seed URLs and moves the run to `Running`
    ///
    /// Every seed is pushed into the frontier and its host registered with a
    /// placeholder latency. Seeds that cannot be split are skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of seeds queued
    /// * `Err(CrawlError)` - The run was already seeded or has finished
    pub fn seed<I>(&mut self, seeds: I) -> Result<usize, CrawlError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.transition(CrawlPhase::Running)?;

        let mut queued = 0;
        for seed in seeds {
            let url = seed.as_ref();
            match split_address(url) {
                Ok(address) => {
                    self.state.mark_discovered(url, &address);
                    self.state.enqueue(url);
                    queued += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping seed: {}", e);
                    self.summary.record_failure(FailureKind::Parse);
                }
            }
        }

        tracing::info!("Seeded frontier with {} URLs", queued);
        Ok(queued)
    }

    /// Current phase of the run
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Read access to the crawl state
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Runs the traversal loop until the run drains
    ///
    /// The loop stops when the frontier is empty or when the page budget has
    /// been used by successful fetches. Both are normal completions.
    pub async fn run(mut self) -> Result<CrawlOutcome, CrawlError> {
        if self.phase == CrawlPhase::Idle {
            self.transition(CrawlPhase::Running)?;
        }

        tracing::info!(
            "Starting crawl: {} URLs queued, page budget {}, {} concurrent fetches, dedup by {:?}",
            self.state.frontier_len(),
            self.config.page_budget,
            self.config.max_concurrent_fetches,
            self.config.dedup_key
        );

        let termination = if self.config.max_concurrent_fetches <= 1 {
            self.run_sequential().await
        } else {
            self.run_pooled().await
        };

        self.transition(CrawlPhase::Drained)?;
        self.summary.finish(termination, &self.state);

        tracing::info!(
            "Crawl drained ({}): {} pages fetched, {} hosts recorded, {} failures",
            termination,
            self.summary.pages_visited,
            self.state.host_count(),
            self.summary.total_failures()
        );

        Ok(CrawlOutcome {
            state: self.state,
            summary: self.summary,
        })
    }

    /// One blocking round trip at a time
    async fn run_sequential(&mut self) -> TerminationReason {
        loop {
            if self.summary.pages_remaining() == 0 {
                return TerminationReason::BudgetReached;
            }

            let Some(url) = self.state.dequeue() else {
                return TerminationReason::FrontierEmpty;
            };

            let address = match split_address(&url) {
                Ok(address) => address,
                Err(e) => {
                    tracing::debug!("Skipping frontier entry: {}", e);
                    self.summary.record_failure(FailureKind::Parse);
                    continue;
                }
            };

            tracing::debug!("Processing URL: {}", url);
            self.summary.fetch_attempts += 1;
            let result = self.fetcher.fetch(&address.host, &address.path).await;
            self.apply(&url, &address, result);

            let delay = self.config.politeness_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Bounded pool of fetch tasks, at most one in flight per host
    async fn run_pooled(&mut self) -> TerminationReason {
        let mut tasks = JoinSet::new();
        let mut in_flight = InFlight::new();

        loop {
            self.dispatch(&mut tasks, &mut in_flight);

            let Some(joined) = tasks.join_next_with_id().await else {
                debug_assert!(self.scheduler.is_idle());
                return if self.summary.pages_remaining() == 0 {
                    TerminationReason::BudgetReached
                } else {
                    TerminationReason::FrontierEmpty
                };
            };

            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(e) => {
                    let host = in_flight
                        .get(&e.id())
                        .map(|(_, address)| address.host.clone())
                        .unwrap_or_default();
                    let failure = FetchError::Aborted {
                        host,
                        reason: e.to_string(),
                    };
                    (e.id(), Err(failure))
                }
            };

            let Some((url, address)) = in_flight.remove(&id) else {
                tracing::error!("Joined fetch task {} that was never dispatched", id);
                continue;
            };

            self.scheduler.finish(&address.host);
            self.apply(&url, &address, result);
        }
    }

    /// Starts fetches until the pool is full or nothing is dispatchable
    fn dispatch(&mut self, tasks: &mut JoinSet<FetchResult>, in_flight: &mut InFlight) {
        while self
            .scheduler
            .has_capacity(self.summary.pages_remaining() as usize)
        {
            let scheduler = &self.scheduler;
            let next = self.state.dequeue_first(|url| match split_address(url) {
                Ok(address) => scheduler.is_host_idle(&address.host),
                // Unparseable entries are taken out and dropped below
                Err(_) => true,
            });

            let Some(url) = next else {
                break;
            };

            let address = match split_address(&url) {
                Ok(address) => address,
                Err(e) => {
                    tracing::debug!("Skipping frontier entry: {}", e);
                    self.summary.record_failure(FailureKind::Parse);
                    continue;
                }
            };

            tracing::debug!("Dispatching URL: {}", url);
            self.scheduler.begin(&address.host);
            self.summary.fetch_attempts += 1;

            let fetcher = Arc::clone(&self.fetcher);
            let delay = self.config.politeness_delay();
            let (host, path) = (address.host.clone(), address.path.clone());
            let handle = tasks.spawn(async move {
                let result = fetcher.fetch(&host, &path).await;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            });

            in_flight.insert(handle.id(), (url, address));
        }
    }

    /// Applies one fetch result to the crawl state
    ///
    /// A failed fetch changes nothing but the failure counters.
    fn apply(&mut self, url: &str, address: &Address, result: FetchResult) {
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Fetch failed for {} ({}): {}", url, e.kind(), e);
                self.summary.record_failure(e.kind());
                return;
            }
        };

        self.state
            .mark_seen(address.host.clone(), HostRecord::fetched(page.elapsed));
        self.summary.pages_visited += 1;

        if let Some(dir) = &self.pages_dir {
            match save_page(dir, &address.host, &address.path, &page.body) {
                Ok(_) => self.summary.pages_saved += 1,
                Err(e) => {
                    tracing::warn!("Failed to save page {}: {}", url, e);
                    self.summary.save_failures += 1;
                }
            }
        }

        self.discover_links(&page.body);

        if self.summary.pages_visited % 10 == 0 {
            tracing::info!(
                "Progress: {} pages fetched, {} in frontier, {} hosts recorded",
                self.summary.pages_visited,
                self.state.frontier_len(),
                self.state.host_count()
            );
        }
    }

    /// Queues every link whose dedup key has not been seen yet
    fn discover_links(&mut self, body: &[u8]) {
        let links = PageLinks::new(body);

        for link in links.iter() {
            self.summary.links_examined += 1;

            let address = match split_address(link) {
                Ok(address) => address,
                Err(_) => {
                    tracing::trace!("Ignoring link without scheme: {}", link);
                    self.summary.links_unparseable += 1;
                    continue;
                }
            };

            if self.state.is_discovered(link, &address) {
                continue;
            }

            tracing::trace!("Discovered {}", link);
            self.state.mark_discovered(link, &address);
            self.state.enqueue(link);
            self.summary.links_enqueued += 1;
        }
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Runs a complete crawl over the network and writes the latency report
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The run drained and the report was written
/// * `Err(CrawlError)` - The report could not be written
///
/// # Example
///
/// ```no_run
/// use hostwalk::config::load_config;
/// use hostwalk::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("hostwalk.toml"))?;
/// let outcome = run_crawl(&config).await?;
/// println!("{} hosts recorded", outcome.state.host_count());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlOutcome, CrawlError> {
    let fetcher = TcpFetcher::new(config.fetcher.clone(), &config.user_agent);
    let mut coordinator = Coordinator::new(config.crawler.clone(), fetcher);
    if let Some(dir) = &config.output.pages_dir {
        coordinator = coordinator.with_pages_dir(dir);
    }
    coordinator.seed(config.seed_urls())?;

    let outcome = coordinator.run().await?;

    write_report(
        outcome.state.host_records(),
        Path::new(&config.output.report_path),
        config.output.host_column_width,
    )?;

    Ok(outcome)
}
