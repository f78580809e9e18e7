//! Link extraction from raw responses
//!
//! Bodies are scanned as text, not parsed as HTML: anything that looks like an
//! absolute `http://`, `https://` or bare `www.` address is a candidate link.
//! Line breaks are removed first so that a link split across network reads or
//! wrapped lines is still found whole.

use once_cell::sync::Lazy;
use regex::Regex;

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://|www\.)[A-Za-z0-9\-+&@#/%=~_|$?!:,.]+")
        .expect("link pattern is valid")
});

/// The text of a fetched page, ready to be scanned for links
///
/// # Example
///
/// ```
/// use hostwalk::crawler::PageLinks;
///
/// let page = PageLinks::new(b"<a href=\"http://foo.com/x\">go</a> visit www.bar.org/y");
/// let links: Vec<&str> = page.iter().collect();
/// assert_eq!(links, vec!["http://foo.com/x", "www.bar.org/y"]);
/// ```
#[derive(Debug, Clone)]
pub struct PageLinks {
    text: String,
}

impl PageLinks {
    /// Decodes a body (lossily) and strips carriage returns and line feeds
    pub fn new(body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body)
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();
        Self { text }
    }

    /// Lazily yields candidate links in order of appearance
    ///
    /// Every call starts a fresh scan of the page.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        LINK_PATTERN.find_iter(&self.text).map(|m| m.as_str())
    }

    /// The cleaned text that is scanned
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Convenience function for collecting every candidate link of a body
pub fn extract_links(body: &[u8]) -> Vec<String> {
    PageLinks::new(body).iter().map(str::to_string).collect()
}
