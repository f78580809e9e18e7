//! Raw HTTP/1.1 fetcher
//!
//! This module issues requests directly over TCP sockets:
//! - IPv4 name resolution
//! - Socket creation with address reuse and an optional connect timeout
//! - A single-write `GET` request with `Connection: close`
//! - Reading until the peer closes the connection, timing the round trip
//!
//! Every failure is returned as a [`FetchError`] value. None of them are
//! fatal to a crawl.

use crate::config::{FetcherConfig, UserAgentConfig};
use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio::time::timeout;

/// Classes of soft failure that make the crawler skip a frontier entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// The host name did not resolve to an IPv4 address
    Resolution,

    /// Socket creation, option setting or connect failed
    Connection,

    /// Sending the request failed
    Transmission,

    /// Reading the response failed before the peer closed the connection
    Receive,

    /// A connect or read did not complete in time
    Timeout,

    /// The URL or host could not be decomposed
    Parse,

    /// The fetch task stopped without producing a result
    Aborted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolution => "resolution",
            Self::Connection => "connection",
            Self::Transmission => "transmission",
            Self::Receive => "receive",
            Self::Timeout => "timeout",
            Self::Parse => "parse",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors produced by a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to resolve {host}: {source}")]
    Resolution { host: String, source: io::Error },

    #[error("No IPv4 address found for {host}")]
    NoAddress { host: String },

    #[error("Invalid host authority: {host}")]
    InvalidHost { host: String },

    #[error("Failed to connect to {host}: {source}")]
    Connect { host: String, source: io::Error },

    #[error("Failed to send request to {host}: {source}")]
    Send { host: String, source: io::Error },

    #[error("Failed to read response from {host}: {source}")]
    Receive { host: String, source: io::Error },

    #[error("Fetch task for {host} stopped: {reason}")]
    Aborted { host: String, reason: String },

    #[error("Timed out during {phase} with {host} after {after:?}")]
    Timeout {
        host: String,
        phase: &'static str,
        after: Duration,
    },
}

impl FetchError {
    /// Maps this error onto its soft-failure class
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Resolution { .. } | Self::NoAddress { .. } => FailureKind::Resolution,
            Self::InvalidHost { .. } => FailureKind::Parse,
            Self::Connect { .. } => FailureKind::Connection,
            Self::Send { .. } => FailureKind::Transmission,
            Self::Receive { .. } => FailureKind::Receive,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Aborted { .. } => FailureKind::Aborted,
        }
    }
}

/// A successfully read response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Status line, headers and body exactly as received
    pub body: Vec<u8>,

    /// Time between the request being sent and the peer closing the connection
    pub elapsed: Duration,
}

/// Result of a fetch operation
pub type FetchResult = Result<FetchedPage, FetchError>;

/// Something that can retrieve a page for the crawler
///
/// [`TcpFetcher`] is the network implementation; tests substitute their own.
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetches `path` from `host`, where `host` may carry a `:port` suffix
    fn fetch(&self, host: &str, path: &str) -> impl Future<Output = FetchResult> + Send;
}

/// Fetches pages with plain HTTP/1.1 over TCP
#[derive(Debug, Clone)]
pub struct TcpFetcher {
    config: FetcherConfig,
    user_agent: String,
}

impl TcpFetcher {
    /// Creates a fetcher from the fetcher and user agent configuration
    pub fn new(config: FetcherConfig, user_agent: &UserAgentConfig) -> Self {
        Self {
            config,
            user_agent: user_agent.header_value(),
        }
    }

    /// The `User-Agent` value sent with every request
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    async fn connect(&self, host: &str, addr: SocketAddr) -> Result<TcpStream, FetchError> {
        let connect_error = |source| FetchError::Connect {
            host: host.to_string(),
            source,
        };

        let socket = TcpSocket::new_v4().map_err(connect_error)?;
        socket.set_reuseaddr(true).map_err(connect_error)?;

        let connecting = socket.connect(addr);
        match self.config.connect_timeout() {
            Some(limit) => timeout(limit, connecting)
                .await
                .map_err(|_| FetchError::Timeout {
                    host: host.to_string(),
                    phase: "connect",
                    after: limit,
                })?
                .map_err(connect_error),
            None => connecting.await.map_err(connect_error),
        }
    }

    /// Reads until a zero-length read, one buffer at a time
    async fn read_to_close(&self, host: &str, stream: &mut TcpStream) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        let mut buffer = vec![0u8; self.config.receive_buffer_size];

        loop {
            let read = stream.read(&mut buffer);
            let outcome = match self.config.read_timeout() {
                Some(limit) => timeout(limit, read).await.map_err(|_| FetchError::Timeout {
                    host: host.to_string(),
                    phase: "read",
                    after: limit,
                })?,
                None => read.await,
            };

            let n = outcome.map_err(|source| FetchError::Receive {
                host: host.to_string(),
                source,
            })?;

            if n == 0 {
                break;
            }
            body.extend_from_slice(&buffer[..n]);
        }

        Ok(body)
    }
}

impl PageFetcher for TcpFetcher {
    async fn fetch(&self, host: &str, path: &str) -> FetchResult {
        let (name, port) = split_authority(host, self.config.port)?;
        let addr = resolve_ipv4(host, name, port).await?;

        tracing::trace!("Connecting to {} ({})", host, addr);
        let mut stream = self.connect(host, addr).await?;

        let request = build_request(host, path, &self.user_agent);
        stream
            .write_all(request.as_bytes())
            .await
            .map_err(|source| FetchError::Send {
                host: host.to_string(),
                source,
            })?;

        let started = Instant::now();
        let body = self.read_to_close(host, &mut stream).await?;
        let elapsed = started.elapsed();

        tracing::debug!(
            "Fetched {}{} ({} bytes in {:?})",
            host,
            path,
            body.len(),
            elapsed
        );

        Ok(FetchedPage { body, elapsed })
    }
}

/// Builds the request sent for every page
///
/// The request always ends with an empty line and asks the server to close
/// the connection, which is how the end of the response is detected.
pub fn build_request(host: &str, path: &str, user_agent: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nAccept: text/html\r\nUser-Agent: {}\r\nConnection: close\r\n\r\n",
        path, host, user_agent
    )
}

/// Splits `name[:port]` into the name and the port to connect to
fn split_authority(host: &str, default_port: u16) -> Result<(&str, u16), FetchError> {
    let invalid = || FetchError::InvalidHost {
        host: host.to_string(),
    };

    let (name, port) = match host.rsplit_once(':') {
        Some((name, port)) => (name, port.parse::<u16>().map_err(|_| invalid())?),
        None => (host, default_port),
    };

    if name.is_empty() {
        return Err(invalid());
    }

    Ok((name, port))
}

/// Resolves a name to its first IPv4 socket address
async fn resolve_ipv4(host: &str, name: &str, port: u16) -> Result<SocketAddr, FetchError> {
    let mut addrs = lookup_host((name, port))
        .await
        .map_err(|source| FetchError::Resolution {
            host: host.to_string(),
            source,
        })?;

    addrs
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| FetchError::NoAddress {
            host: host.to_string(),
        })
}
