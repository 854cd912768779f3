//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end. Network failures that a local server
//! cannot produce are driven through a scripted transport.

use async_trait::async_trait;
use broken_link_checker::config::{parse_config, Config, CrawlSettings};
use broken_link_checker::crawler::{
    Coordinator, FetchResponse, HtmlLinkExtractor, Transport, TransportError,
};
use broken_link_checker::output::{
    read_records, ErrorTag, JsonOutputHandler, LinkRecord, RecordEmitter, RecordStatus,
    SharedStorage, SqliteOutputHandler,
};
use broken_link_checker::storage::{RunStatus, SqliteStorage, Storage};
use broken_link_checker::CheckerError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given seed with no dispatch delay
fn create_test_config(seed: &str) -> Config {
    parse_config(&format!(
        r#"
[crawler]
seed-url = "{}"
max-concurrency = 4
dispatch-delay = 0
request-timeout = 5000
"#,
        seed
    ))
    .expect("test config should be valid")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

async fn mount_page(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn crawl(config: &Config) -> (RunStatus, Vec<LinkRecord>) {
    let report = Coordinator::from_config(config)
        .expect("coordinator")
        .run(CancellationToken::new(), RecordEmitter::new())
        .await
        .expect("crawl should run");
    (report.status, report.records)
}

#[tokio::test]
async fn test_reports_missing_internal_page() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", r#"<a href="/a">A</a> <a href="/missing">Gone</a>"#).await;
    mount_page(&server, "/a", "<p>fine</p>").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;

    let (status, records) = crawl(&create_test_config(&seed)).await;

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.status, RecordStatus::Code(404));
    assert_eq!(record.link_url, format!("{}/missing", server.uri()));
    assert_eq!(record.referer, seed);
    assert_eq!(record.link_text, "Gone");
    assert_eq!(record.link_img, "");
    assert_eq!(record.redirect_url, None);
    assert_eq!(record.response_url, None);
}

#[tokio::test]
async fn test_healthy_external_link_produces_no_record() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &site,
        "/",
        &format!(r#"<a href="{}/page">Partner</a>"#, external.uri()),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("<p>hello</p>"))
        .expect(1)
        .mount(&external)
        .await;

    let (status, records) = crawl(&create_test_config(&format!("{}/", site.uri()))).await;

    assert_eq!(status, RunStatus::Completed);
    assert!(records.is_empty(), "unexpected records: {:?}", records);
}

#[tokio::test]
async fn test_external_pages_are_probed_but_not_followed() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &site,
        "/",
        &format!(r#"<a href="{}/hub">Hub</a>"#, external.uri()),
    )
    .await;
    mount_page(&external, "/hub", r#"<a href="/deeper">Deeper</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&external)
        .await;

    let (_, records) = crawl(&create_test_config(&format!("{}/", site.uri()))).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_broken_external_link_reports_response_url() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &site,
        "/",
        &format!(r#"<a href="{}/down">Status</a>"#, external.uri()),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&external)
        .await;

    let (_, records) = crawl(&create_test_config(&format!("{}/", site.uri()))).await;

    assert_eq!(records.len(), 1);
    let expected = format!("{}/down", external.uri());
    assert_eq!(records[0].status, RecordStatus::Code(500));
    assert_eq!(records[0].link_url, expected);
    assert_eq!(records[0].response_url.as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_invalid_href_is_never_fetched() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="not a url">Broken markup</a>"#).await;

    let (status, records) = crawl(&create_test_config(&format!("{}/", server.uri()))).await;

    assert_eq!(status, RunStatus::Completed);
    assert!(records.is_empty());

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1, "only the seed should be requested");
}

#[tokio::test]
async fn test_each_url_is_fetched_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a> <a href="/b">B</a> <a href="/a#section">A again</a>"#,
    )
    .await;
    mount_page(&server, "/b", r#"<a href="/a">A</a> <a href="/">Home</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/b">B</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let report = Coordinator::from_config(&create_test_config(&format!("{}/", server.uri())))
        .unwrap()
        .run(CancellationToken::new(), RecordEmitter::new())
        .await
        .unwrap();

    assert_eq!(report.stats.dispatched, 3);
    assert!(report.records.is_empty());
}

#[tokio::test]
async fn test_redirect_to_missing_page_records_redirect_url() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/old">Old docs</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let (_, records) = crawl(&create_test_config(&format!("{}/", server.uri()))).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, RecordStatus::Code(410));
    assert_eq!(records[0].link_url, format!("{}/old", server.uri()));
    assert_eq!(
        records[0].redirect_url.as_deref(),
        Some(format!("{}/new", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_non_html_target_is_recorded() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/report.pdf">Annual report</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&server)
        .await;

    let (_, records) = crawl(&create_test_config(&format!("{}/", server.uri()))).await;

    let pdf = format!("{}/report.pdf", server.uri());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, RecordStatus::Code(200));
    assert_eq!(records[0].link_url, pdf);
    assert_eq!(records[0].link_img, pdf);
    assert_eq!(records[0].link_text, "");
}

#[tokio::test]
async fn test_deny_patterns_skip_links() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/logout">Log out</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&format!("{}/", server.uri()));
    config.crawler.deny_patterns = vec!["/logout".to_string()];

    let report = Coordinator::from_config(&config)
        .unwrap()
        .run(CancellationToken::new(), RecordEmitter::new())
        .await
        .unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.stats.denied, 1);
}

#[tokio::test]
async fn test_sinks_receive_records() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("output.json");
    let db_path = dir.path().join("runs.db");

    mount_page(&server, "/", r#"<a href="/missing">Gone</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let storage: SharedStorage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).unwrap()));
    let sqlite = SqliteOutputHandler::start(Arc::clone(&storage), &seed, "hash").unwrap();
    let run_id = sqlite.run_id();

    let emitter = RecordEmitter::new()
        .with_handler(Box::new(JsonOutputHandler::new(&json_path)))
        .with_handler(Box::new(sqlite));

    let report = Coordinator::from_config(&create_test_config(&seed))
        .unwrap()
        .run(CancellationToken::new(), emitter)
        .await
        .unwrap();

    let written = read_records(&json_path).unwrap();
    assert_eq!(written, report.records);
    assert_eq!(written.len(), 1);

    let storage = storage.lock().unwrap();
    let run = storage.get_run(run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(storage.get_records(run_id).unwrap(), report.records);
}

#[tokio::test]
async fn test_cancelled_run_is_interrupted_and_flushed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("output.json");

    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = Coordinator::from_config(&create_test_config(&format!("{}/", server.uri())))
        .unwrap()
        .run(
            cancel,
            RecordEmitter::new().with_handler(Box::new(JsonOutputHandler::new(&json_path))),
        )
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Interrupted);
    assert_eq!(report.stats.dispatched, 0);
    assert!(read_records(&json_path).unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_drains_in_flight_fetches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("output.json");

    mount_page(
        &server,
        "/",
        r#"<a href="/slow">Slow</a> <a href="/later">Later</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/later"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&format!("{}/", server.uri()));
    config.crawler.max_concurrency = 1;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    let report = Coordinator::from_config(&config)
        .unwrap()
        .run(
            cancel,
            RecordEmitter::new().with_handler(Box::new(JsonOutputHandler::new(&json_path))),
        )
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Interrupted);
    assert_eq!(report.stats.dispatched, 2);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].link_url, format!("{}/slow", server.uri()));
    assert_eq!(report.records[0].status, RecordStatus::Code(404));
    assert_eq!(read_records(&json_path).unwrap(), report.records);
}

/// What the scripted transport does for one URL
#[derive(Clone)]
enum Script {
    Html(&'static str),
    DnsFailure,
    Hang,
    Panic,
}

/// Transport answering from a fixed table, recording every request
struct ScriptedTransport {
    routes: HashMap<String, Script>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(routes: &[(&str, Script)]) -> Self {
        Self {
            routes: routes
                .iter()
                .map(|(url, script)| (url.to_string(), script.clone()))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<FetchResponse, TransportError> {
        self.requested.lock().unwrap().push(url.to_string());

        match self.routes.get(url.as_str()) {
            Some(Script::Html(body)) => Ok(FetchResponse {
                final_url: url.clone(),
                status: 200,
                content_type: Some("text/html".to_string()),
                body: Some(body.to_string()),
                redirect_chain: Vec::new(),
            }),
            Some(Script::DnsFailure) => Err(TransportError::dns(format!(
                "failed to lookup address for {}",
                url
            ))),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(TransportError::other("unreachable"))
            }
            Some(Script::Panic) => panic!("transport bug while fetching {}", url),
            None => Ok(FetchResponse {
                final_url: url.clone(),
                status: 404,
                content_type: None,
                body: None,
                redirect_chain: Vec::new(),
            }),
        }
    }
}

fn scripted_settings(seed: &str) -> CrawlSettings {
    let mut settings = CrawlSettings::new(seed);
    settings.dispatch_delay = Duration::ZERO;
    settings.request_timeout = Duration::from_millis(100);
    settings
}

#[tokio::test]
async fn test_dns_failure_on_image_link() {
    let transport = Arc::new(ScriptedTransport::new(&[
        (
            "https://site.test/",
            Script::Html(r#"<a href="https://gone.invalid/"><img src="/logo.png"></a>"#),
        ),
        ("https://gone.invalid/", Script::DnsFailure),
    ]));

    let report = Coordinator::new(
        scripted_settings("https://site.test/"),
        transport.clone(),
        Arc::new(HtmlLinkExtractor::new()),
    )
    .run(CancellationToken::new(), RecordEmitter::new())
    .await
    .unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.status, RecordStatus::Error(ErrorTag::DnsLookup));
    assert_eq!(record.link_url, "https://gone.invalid/");
    assert_eq!(record.referer, "https://site.test/");
    assert_eq!(record.link_text, "");
    assert_eq!(record.link_img, "https://site.test/logo.png");
    assert_eq!(report.stats.failed, 1);
    assert_eq!(transport.requested().len(), 2);
}

#[tokio::test]
async fn test_hanging_fetch_times_out() {
    let transport = Arc::new(ScriptedTransport::new(&[
        (
            "https://site.test/",
            Script::Html(r#"<a href="/slow">Slow page</a>"#),
        ),
        ("https://site.test/slow", Script::Hang),
    ]));

    let report = Coordinator::new(
        scripted_settings("https://site.test/"),
        transport,
        Arc::new(HtmlLinkExtractor::new()),
    )
    .run(CancellationToken::new(), RecordEmitter::new())
    .await
    .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].status, RecordStatus::Error(ErrorTag::Timeout));
    assert_eq!(report.records[0].link_text, "Slow page");
}

#[tokio::test]
async fn test_seed_failure_is_reported_against_itself() {
    let transport = Arc::new(ScriptedTransport::new(&[(
        "https://site.test/",
        Script::DnsFailure,
    )]));

    let report = Coordinator::new(
        scripted_settings("https://site.test/"),
        transport,
        Arc::new(HtmlLinkExtractor::new()),
    )
    .run(CancellationToken::new(), RecordEmitter::new())
    .await
    .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].referer, "https://site.test/");
    assert_eq!(report.records[0].link_url, "https://site.test/");
}

#[tokio::test]
async fn test_invalid_seed_fails_before_fetching() {
    let transport = Arc::new(ScriptedTransport::new(&[]));

    let result = Coordinator::new(
        CrawlSettings::new("not a url"),
        transport.clone(),
        Arc::new(HtmlLinkExtractor::new()),
    )
    .run(CancellationToken::new(), RecordEmitter::new())
    .await;

    assert!(result.is_err());
    assert!(transport.requested().is_empty());
}

#[tokio::test]
async fn test_aborted_run_still_flushes_sinks() {
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("output.json");
    let transport = Arc::new(ScriptedTransport::new(&[
        (
            "https://site.test/",
            Script::Html(r#"<a href="/missing">Gone</a> <a href="/crash">Crash</a>"#),
        ),
        ("https://site.test/crash", Script::Panic),
    ]));

    let mut settings = scripted_settings("https://site.test/");
    settings.max_concurrency = 1;

    let result = Coordinator::new(settings, transport, Arc::new(HtmlLinkExtractor::new()))
        .run(
            CancellationToken::new(),
            RecordEmitter::new().with_handler(Box::new(JsonOutputHandler::new(&json_path))),
        )
        .await;

    assert!(matches!(result, Err(CheckerError::Join(_))));

    let written = read_records(&json_path).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].link_url, "https://site.test/missing");
    assert_eq!(written[0].status, RecordStatus::Code(404));
}
