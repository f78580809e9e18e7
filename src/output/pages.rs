//! Saving fetched pages to disk
//!
//! Each successfully fetched response is written to its own file. The file
//! name is `host/path` with every character outside `[A-Za-z0-9]` replaced by
//! `_`, so `example.com/a/b.html` becomes `example_com_a_b_html`.

use crate::output::OutputResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("sanitizer pattern is valid"));

/// File name used for the page at `host` + `path`
pub fn page_file_name(host: &str, path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    let full = format!("{}/{}", host, path);
    UNSAFE_CHARS.replace_all(&full, "_").into_owned()
}

/// Writes a fetched response into `dir`, replacing any earlier copy
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - Failed to create the directory or write the file
pub fn save_page(dir: &Path, host: &str, path: &str, body: &[u8]) -> OutputResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let file = dir.join(page_file_name(host, path));
    fs::write(&file, body)?;

    tracing::trace!("Saved {}{} to {}", host, path, file.display());
    Ok(file)
}
