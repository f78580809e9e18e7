//! Dispatch bookkeeping for concurrent fetching
//!
//! This module handles:
//! - The global cap on fetches in flight
//! - The page budget still available to new dispatches
//! - At most one fetch in flight per host

use std::collections::HashSet;

/// Tracks which fetches are in flight and whether another may start
///
/// The scheduler never holds URLs itself; the frontier stays in
/// [`CrawlState`](crate::state::CrawlState). It only answers whether a given
/// host may be dispatched now.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Maximum number of concurrent fetches
    max_in_flight: usize,

    /// Hosts with a fetch currently in flight
    in_flight: HashSet<String>,
}

impl Scheduler {
    /// Creates a scheduler allowing `max_in_flight` concurrent fetches
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            in_flight: HashSet::new(),
        }
    }

    /// Returns true if another fetch may start
    ///
    /// `pages_remaining` is the part of the page budget not yet used by
    /// successful fetches. In-flight fetches may all succeed, so they count
    /// against it.
    pub fn has_capacity(&self, pages_remaining: usize) -> bool {
        let in_flight = self.in_flight.len();
        in_flight < self.max_in_flight && in_flight < pages_remaining
    }

    /// Returns true if no fetch is in flight for this host
    pub fn is_host_idle(&self, host: &str) -> bool {
        !self.in_flight.contains(host)
    }

    /// Records that a fetch for this host started
    ///
    /// Returns false if one was already in flight.
    pub fn begin(&mut self, host: &str) -> bool {
        self.in_flight.insert(host.to_string())
    }

    /// Records that the fetch for this host finished
    pub fn finish(&mut self, host: &str) {
        self.in_flight.remove(host);
    }

    /// Number of fetches currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns whether nothing is in flight
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }
}
