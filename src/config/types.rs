use crate::state::DedupKey;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Hostwalk
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "seed")]
    pub seeds: Vec<SeedEntry>,
}

impl Config {
    /// Seed URLs in configuration order
    pub fn seed_urls(&self) -> Vec<String> {
        self.seeds.iter().map(|s| s.url.clone()).collect()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of successfully fetched pages per run
    #[serde(rename = "page-budget", default = "default_page_budget")]
    pub page_budget: u32,

    /// Number of fetches allowed in flight at once (1 = sequential)
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Pause after each fetch (milliseconds)
    #[serde(rename = "politeness-delay-ms", default)]
    pub politeness_delay_ms: u64,

    /// Whether discovered links are deduplicated by host or by URL
    #[serde(rename = "dedup-key", default)]
    pub dedup_key: DedupKey,
}

impl CrawlerConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_budget: default_page_budget(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            politeness_delay_ms: 0,
            dedup_key: DedupKey::default(),
        }
    }
}

/// Raw TCP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Port used when a host carries no explicit `:port`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Size of the buffer used for each individual read
    #[serde(rename = "receive-buffer-size", default = "default_receive_buffer_size")]
    pub receive_buffer_size: usize,

    /// Connect timeout in milliseconds, 0 disables it
    #[serde(rename = "connect-timeout-ms", default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Timeout for each read in milliseconds, 0 disables it
    #[serde(rename = "read-timeout-ms", default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl FetcherConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.read_timeout_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            receive_buffer_size: default_receive_buffer_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the latency report
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,

    /// Width of the left-justified host column
    #[serde(rename = "host-column-width", default = "default_host_column_width")]
    pub host_column_width: usize,

    /// Directory that receives a copy of every fetched page, unset to skip saving
    #[serde(rename = "pages-dir", default)]
    pub pages_dir: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            host_column_width: default_host_column_width(),
            pages_dir: None,
        }
    }
}

/// Seed URL entry
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Absolute URL to start crawling from
    pub url: String,
}

fn default_page_budget() -> u32 {
    50
}

fn default_max_concurrent_fetches() -> u32 {
    1
}

fn default_port() -> u16 {
    80
}

fn default_receive_buffer_size() -> usize {
    8192
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_read_timeout_ms() -> u64 {
    30_000
}

fn default_report_path() -> String {
    "./latency.txt".to_string()
}

fn default_host_column_width() -> usize {
    50
}

fn non_zero_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
