//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end over real TCP connections.

use hostwalk::config::{
    Config, CrawlerConfig, FetcherConfig, OutputConfig, SeedEntry, UserAgentConfig,
};
use hostwalk::crawler::run_crawl;
use hostwalk::output::TerminationReason;
use hostwalk::state::DedupKey;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given seeds and report path
fn create_test_config(seeds: Vec<String>, report_path: &str, page_budget: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            page_budget,
            max_concurrent_fetches: 1,
            politeness_delay_ms: 0,
            dedup_key: DedupKey::Host,
        },
        fetcher: FetcherConfig {
            connect_timeout_ms: 2_000,
            read_timeout_ms: 2_000,
            ..FetcherConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            report_path: report_path.to_string(),
            host_column_width: 50,
            pages_dir: None,
        },
        seeds: seeds.into_iter().map(|url| SeedEntry { url }).collect(),
    }
}

/// Host key for a mock server, e.g. `127.0.0.1:40123`
fn host_of(server: &MockServer) -> String {
    server.address().to_string()
}

#[tokio::test]
async fn test_crawl_follows_link_to_second_host() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body><a href="{}/next">Next</a></body></html>"#,
            second.uri()
        )))
        .expect(1)
        .mount(&first)
        .await;

    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>End</body></html>"))
        .expect(1)
        .mount(&second)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("latency.txt");
    let config = create_test_config(
        vec![format!("{}/", first.uri())],
        report_path.to_str().unwrap(),
        10,
    );

    let outcome = run_crawl(&config).await.expect("Crawl failed");

    let records = outcome.state.host_records();
    assert_eq!(records.len(), 2);
    assert!(records[&host_of(&first)].is_fetched());
    assert!(records[&host_of(&second)].is_fetched());
    assert_eq!(outcome.summary.pages_visited, 2);
    assert_eq!(
        outcome.summary.termination,
        Some(TerminationReason::FrontierEmpty)
    );

    let report = std::fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Host"));
    assert!(lines[1].starts_with(&host_of(&first)));
    assert!(lines[2].starts_with(&host_of(&second)));
}

#[tokio::test]
async fn test_crawl_stops_at_page_budget() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("see {}/ for more", second.uri())),
        )
        .mount(&first)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nothing here"))
        .expect(0)
        .mount(&second)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("latency.txt");
    let config = create_test_config(
        vec![format!("{}/", first.uri())],
        report_path.to_str().unwrap(),
        1,
    );

    let outcome = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(outcome.summary.pages_visited, 1);
    assert_eq!(
        outcome.summary.termination,
        Some(TerminationReason::BudgetReached)
    );

    // The second host was discovered but never fetched
    let report = std::fs::read_to_string(&report_path).unwrap();
    let last = report.lines().last().unwrap();
    assert!(last.starts_with(&host_of(&second)));
    assert!(last.ends_with("0.000000"));
}

#[tokio::test]
async fn test_unreachable_host_is_skipped() {
    let server = MockServer::start().await;

    // Bind and release a port so nothing is listening on it
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = closed.local_addr().unwrap();
    drop(closed);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("latency.txt");
    let config = create_test_config(
        vec![format!("http://{}/", dead), format!("{}/", server.uri())],
        report_path.to_str().unwrap(),
        10,
    );

    let outcome = run_crawl(&config).await.expect("Crawl failed");

    let records = outcome.state.host_records();
    assert!(!records[&dead.to_string()].is_fetched());
    assert!(records[&host_of(&server)].is_fetched());
    assert_eq!(outcome.summary.pages_visited, 1);
    assert_eq!(outcome.summary.total_failures(), 1);
}

#[tokio::test]
async fn test_pooled_crawl_fetches_every_host() {
    let leaves = vec![
        MockServer::start().await,
        MockServer::start().await,
        MockServer::start().await,
    ];
    let root = MockServer::start().await;

    let links: Vec<String> = leaves.iter().map(|s| format!("{}/", s.uri())).collect();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(links.join(" ")))
        .mount(&root)
        .await;

    for leaf in &leaves {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("leaf"))
            .expect(1)
            .mount(leaf)
            .await;
    }

    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("latency.txt");
    let mut config = create_test_config(
        vec![format!("{}/", root.uri())],
        report_path.to_str().unwrap(),
        10,
    );
    config.crawler.max_concurrent_fetches = 3;

    let outcome = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(outcome.summary.pages_visited, 4);
    assert_eq!(outcome.summary.hosts_fetched, 4);
}

#[tokio::test]
async fn test_crawl_saves_fetched_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>saved</p>"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let report_path = temp_dir.path().join("latency.txt");
    let pages_dir = temp_dir.path().join("pages");
    let mut config = create_test_config(
        vec![format!("{}/index.html", server.uri())],
        report_path.to_str().unwrap(),
        10,
    );
    config.output.pages_dir = Some(pages_dir.to_str().unwrap().to_string());

    let outcome = run_crawl(&config).await.expect("Crawl failed");
    assert_eq!(outcome.summary.pages_saved, 1);

    let name = hostwalk::output::page_file_name(&host_of(&server), "/index.html");
    let saved = std::fs::read_to_string(pages_dir.join(name)).unwrap();
    assert!(saved.starts_with("HTTP/1.1 200"));
    assert!(saved.ends_with("<p>saved</p>"));
}
