//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - Raw TCP fetching with connect and read timeouts
//! - Absolute link extraction from raw responses
//! - Dispatch bookkeeping for concurrent fetches
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use extractor::{extract_links, PageLinks};
pub use fetcher::{
    build_request, FailureKind, FetchError, FetchResult, FetchedPage, PageFetcher, TcpFetcher,
};
pub use scheduler::Scheduler;
