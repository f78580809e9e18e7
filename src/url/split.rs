use crate::{UrlError, UrlResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Any scheme, an optional `www.` prefix, then everything up to the first
/// `/`, `?` or `#` is the host and the rest is the path.
static ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://(?i:www\.)?([^/?#]+)(.*)$")
        .expect("address pattern is valid")
});

/// A URL decomposed into the parts needed to issue a request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Lowercased host, possibly carrying a `:port` suffix
    pub host: String,

    /// Request path, always starting with `/`
    pub path: String,
}

/// Splits an absolute URL into its host and path
///
/// The host is lowercased and never carries a trailing slash, query or
/// fragment. A leading `www.` is dropped. The path always starts with `/` and defaults to `/`
/// when the URL has none.
///
/// # Errors
///
/// Returns [`UrlError::Malformed`] when the string has no `scheme://host`
/// shape. Callers treat that as "skip this entry".
///
/// # Examples
///
/// ```
/// use hostwalk::url::split_address;
///
/// let address = split_address("http://Example.com/a/b").unwrap();
/// assert_eq!(address.host, "example.com");
/// assert_eq!(address.path, "/a/b");
///
/// let address = split_address("http://example.com").unwrap();
/// assert_eq!(address.path, "/");
/// ```
pub fn split_address(url: &str) -> UrlResult<Address> {
    let captures = ADDRESS_PATTERN
        .captures(url)
        .ok_or_else(|| UrlError::Malformed(url.to_string()))?;

    let host = captures
        .get(1)
        .map(|m| m.as_str().to_ascii_lowercase())
        .ok_or_else(|| UrlError::Malformed(url.to_string()))?;

    let rest = captures.get(2).map_or("", |m| m.as_str());
    let path = if rest.starts_with('/') {
        rest.to_string()
    } else {
        // A query or fragment right after the host still needs a root path
        format!("/{}", rest)
    };

    Ok(Address { host, path })
}
