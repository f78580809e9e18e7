//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the frontier, per-host latency records and dedup keys of one run
//! - `DedupKey`: whether discovery is deduplicated by host or by full URL
//! - `CrawlPhase`: the idle → running → drained lifecycle of a run

mod crawl_state;
mod phase;

// Re-export main types
pub use crawl_state::{CrawlState, DedupKey, HostRecord};
pub use phase::CrawlPhase;
