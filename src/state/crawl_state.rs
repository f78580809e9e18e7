use crate::url::Address;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// Which part of a discovered URL decides whether it was already seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupKey {
    /// Only the first URL discovered for each host is ever crawled
    #[default]
    Host,

    /// Every distinct URL is crawled once
    Url,
}

impl DedupKey {
    /// Returns the dedup key for a URL under this policy
    pub fn key_for<'a>(&self, url: &'a str, address: &'a Address) -> &'a str {
        match self {
            Self::Host => &address.host,
            Self::Url => url,
        }
    }
}

/// Per-host latency record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostRecord {
    /// Time from request sent to connection closed, `None` until fetched
    pub latency: Option<Duration>,
}

impl HostRecord {
    /// A host that has been discovered and queued but not fetched
    pub fn queued() -> Self {
        Self { latency: None }
    }

    /// A host whose page was fetched in `latency`
    pub fn fetched(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
        }
    }

    /// Returns true once a page of this host has been fetched
    pub fn is_fetched(&self) -> bool {
        self.latency.is_some()
    }

    /// Latency in seconds, `0.0` for a host that was never fetched
    pub fn seconds(&self) -> f64 {
        self.latency.map(|d| d.as_secs_f64()).unwrap_or(0.0)
    }
}

/// Frontier and host records for a single crawl run
///
/// The frontier is a FIFO of full URL strings and may hold several URLs for
/// the same host. Host records keep discovery order. The discovered-key set
/// follows the configured [`DedupKey`] policy.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    frontier: VecDeque<String>,
    hosts: IndexMap<String, HostRecord>,
    discovered: HashSet<String>,
    dedup: DedupKey,
}

impl CrawlState {
    /// Creates an empty state using the given dedup policy
    pub fn new(dedup: DedupKey) -> Self {
        Self {
            dedup,
            ..Self::default()
        }
    }

    /// Appends a URL to the tail of the frontier
    pub fn enqueue(&mut self, url: impl Into<String>) {
        self.frontier.push_back(url.into());
    }

    /// Pops the URL at the head of the frontier
    pub fn dequeue(&mut self) -> Option<String> {
        self.frontier.pop_front()
    }

    /// Removes and returns the first queued URL accepted by `ready`
    ///
    /// URLs ahead of it keep their position.
    pub fn dequeue_first(&mut self, mut ready: impl FnMut(&str) -> bool) -> Option<String> {
        let index = self.frontier.iter().position(|url| ready(url))?;
        self.frontier.remove(index)
    }

    /// Returns true if a record exists for this host
    pub fn is_host_seen(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }

    /// Inserts or overwrites the record for a host
    pub fn mark_seen(&mut self, host: impl Into<String>, record: HostRecord) {
        self.hosts.insert(host.into(), record);
    }

    /// Returns true if this URL's dedup key was already discovered
    pub fn is_discovered(&self, url: &str, address: &Address) -> bool {
        self.discovered.contains(self.dedup.key_for(url, address))
    }

    /// Registers a URL's dedup key and a placeholder record for its host
    ///
    /// An existing host record is left untouched, so a measured latency is
    /// never reset to the placeholder.
    pub fn mark_discovered(&mut self, url: &str, address: &Address) {
        let key = self.dedup.key_for(url, address).to_string();
        self.discovered.insert(key);

        if !self.hosts.contains_key(&address.host) {
            self.hosts.insert(address.host.clone(), HostRecord::queued());
        }
    }

    /// Returns the record of a host, if any
    pub fn host_record(&self, host: &str) -> Option<&HostRecord> {
        self.hosts.get(host)
    }

    /// Host records in discovery order
    pub fn host_records(&self) -> &IndexMap<String, HostRecord> {
        &self.hosts
    }

    /// Number of distinct hosts recorded
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Number of URLs waiting in the frontier
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_frontier_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// The dedup policy of this run
    pub fn dedup_key(&self) -> DedupKey {
        self.dedup
    }
}
