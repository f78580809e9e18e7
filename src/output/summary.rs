//! Run summary and statistics printing
//!
//! This module collects counters while a crawl runs and prints them once
//! the run has drained.

use crate::crawler::FailureKind;
use crate::state::CrawlState;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Why the traversal loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// No URLs were left to fetch
    FrontierEmpty,

    /// The page budget was used up
    BudgetReached,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontierEmpty => write!(f, "frontier empty"),
            Self::BudgetReached => write!(f, "page budget reached"),
        }
    }
}

/// Summary statistics for a crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub termination: Option<TerminationReason>,

    // Traversal counters
    pub page_budget: u32,
    pub pages_visited: u32,
    pub fetch_attempts: u64,
    pub failures: BTreeMap<FailureKind, u64>,
    pub pages_saved: u64,
    pub save_failures: u64,

    // Link counters
    pub links_examined: u64,
    pub links_enqueued: u64,
    pub links_unparseable: u64,

    // Host counters, filled when the run finishes
    pub hosts_recorded: usize,
    pub hosts_fetched: usize,
    pub frontier_remaining: usize,
}

impl CrawlSummary {
    /// Starts a summary for a run with the given page budget
    pub fn new(page_budget: u32) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            termination: None,
            page_budget,
            pages_visited: 0,
            fetch_attempts: 0,
            failures: BTreeMap::new(),
            pages_saved: 0,
            save_failures: 0,
            links_examined: 0,
            links_enqueued: 0,
            links_unparseable: 0,
            hosts_recorded: 0,
            hosts_fetched: 0,
            frontier_remaining: 0,
        }
    }

    /// Counts one soft failure
    pub fn record_failure(&mut self, kind: FailureKind) {
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    /// Number of failures of one kind
    pub fn failures_of(&self, kind: FailureKind) -> u64 {
        self.failures.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of soft failures
    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }

    /// Pages left in the budget
    pub fn pages_remaining(&self) -> u32 {
        self.page_budget.saturating_sub(self.pages_visited)
    }

    /// Stamps the end of the run and copies the final host counts
    pub fn finish(&mut self, termination: TerminationReason, state: &CrawlState) {
        self.finished_at = Some(Utc::now());
        self.termination = Some(termination);
        self.hosts_recorded = state.host_count();
        self.hosts_fetched = state
            .host_records()
            .values()
            .filter(|record| record.is_fetched())
            .count();
        self.frontier_remaining = state.frontier_len();
    }

    /// Wall-clock duration of the run in seconds, once finished
    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Percentage of fetch attempts that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.fetch_attempts == 0 {
            0.0
        } else {
            (self.pages_visited as f64 / self.fetch_attempts as f64) * 100.0
        }
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    if let Some(finished) = summary.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = summary.duration_seconds() {
        println!("  Duration: {:.2}s", duration);
    }
    if let Some(termination) = summary.termination {
        println!("  Stopped because: {}", termination);
    }
    println!();

    println!("Pages:");
    println!(
        "  Fetched: {} / {} (budget)",
        summary.pages_visited, summary.page_budget
    );
    println!("  Attempts: {}", summary.fetch_attempts);
    println!("  Left in frontier: {}", summary.frontier_remaining);
    if summary.pages_saved > 0 || summary.save_failures > 0 {
        println!(
            "  Saved: {} ({} failed)",
            summary.pages_saved, summary.save_failures
        );
    }
    println!();

    println!("Hosts:");
    println!("  Recorded: {}", summary.hosts_recorded);
    println!("  Fetched: {}", summary.hosts_fetched);
    println!(
        "  Discovered only: {}",
        summary.hosts_recorded.saturating_sub(summary.hosts_fetched)
    );
    println!();

    println!("Links:");
    println!("  Examined: {}", summary.links_examined);
    println!("  Enqueued: {}", summary.links_enqueued);
    println!("  Unparseable: {}", summary.links_unparseable);
    println!();

    if !summary.failures.is_empty() {
        println!("Failures:");
        for (kind, count) in &summary.failures {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} fetches)",
        summary.success_rate(),
        summary.pages_visited,
        summary.fetch_attempts
    );
}
