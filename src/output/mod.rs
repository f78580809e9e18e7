//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Writing the per-host latency report
//! - Saving fetched pages
//! - Collecting and printing run statistics

mod pages;
mod report;
pub mod summary;

pub use pages::{page_file_name, save_page};
pub use report::{format_report, write_report};
pub use summary::{print_summary, CrawlSummary, TerminationReason};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
