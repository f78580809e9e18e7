//! Latency report generation
//!
//! The report is a plain text table: a header line, then one line per host
//! in discovery order. The host column is left-justified to a fixed width and
//! followed by the latency in seconds. Hosts that were discovered but never
//! fetched show `0.000000`.

use crate::output::OutputResult;
use crate::state::HostRecord;
use indexmap::IndexMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const HOST_HEADER: &str = "Host";
const LATENCY_HEADER: &str = "Response Time (s)";

/// Writes the latency report, replacing any existing file
///
/// # Arguments
///
/// * `records` - Host records in the order they should appear
/// * `output_path` - Path where the report should be written
/// * `host_width` - Width of the host column
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_report(
    records: &IndexMap<String, HostRecord>,
    output_path: &Path,
    host_width: usize,
) -> OutputResult<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let report = format_report(records, host_width);

    let mut file = File::create(output_path)?;
    file.write_all(report.as_bytes())?;

    tracing::info!(
        "Wrote latency report for {} hosts to {}",
        records.len(),
        output_path.display()
    );

    Ok(())
}

/// Formats host records as the report table
pub fn format_report(records: &IndexMap<String, HostRecord>, host_width: usize) -> String {
    let mut report = String::new();

    report.push_str(&format_row(HOST_HEADER, LATENCY_HEADER, host_width));
    for (host, record) in records {
        let latency = format!("{:.6}", record.seconds());
        report.push_str(&format_row(host, &latency, host_width));
    }

    report
}

fn format_row(host: &str, value: &str, host_width: usize) -> String {
    // Keep the columns apart when a host fills the whole field
    let separator = if host.chars().count() >= host_width {
        " "
    } else {
        ""
    };
    format!("{:<width$}{}{}\n", host, separator, value, width = host_width)
}
