use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// Main configuration structure for the broken link checker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Starting point of the crawl; its authority defines what is internal
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// HTTP status codes that produce a broken-link record
    #[serde(rename = "reportable-statuses", default = "default_reportable_statuses")]
    pub reportable_statuses: Vec<u16>,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Minimum time between two dispatches of the same run (milliseconds)
    #[serde(rename = "dispatch-delay", default = "default_dispatch_delay")]
    pub dispatch_delay: u64,

    /// Per-fetch timeout (milliseconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum number of redirect hops followed per fetch
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Regex patterns; matching candidate links are never enqueued
    #[serde(rename = "deny-patterns", default)]
    pub deny_patterns: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default)]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: String::new(),
            contact_email: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// `Name/Version`, followed by `(+url; email)` when contact details are set.
    pub fn header_value(&self) -> String {
        let contact: Vec<String> = [
            (!self.contact_url.is_empty()).then(|| format!("+{}", self.contact_url)),
            (!self.contact_email.is_empty()).then(|| self.contact_email.clone()),
        ]
        .into_iter()
        .flatten()
        .collect();

        if contact.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} ({})",
                self.crawler_name,
                self.crawler_version,
                contact.join("; ")
            )
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON array of link records
    #[serde(rename = "json-path", default = "default_json_path")]
    pub json_path: String,

    /// Path written by the contact-link filter
    #[serde(rename = "filtered-path", default = "default_filtered_path")]
    pub filtered_path: String,

    /// Optional SQLite database receiving every record
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Optional markdown summary written after the run
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: default_json_path(),
            filtered_path: default_filtered_path(),
            database_path: None,
            summary_path: None,
        }
    }
}

/// Run configuration handed to the scheduler
///
/// Built from a validated [`Config`]; holds exactly what the traversal engine
/// needs and nothing about output.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub seed_url: String,
    pub reportable_statuses: BTreeSet<u16>,
    pub max_concurrency: usize,
    pub dispatch_delay: Duration,
    pub request_timeout: Duration,
    pub deny_patterns: Vec<String>,
}

impl CrawlSettings {
    /// Settings with the default limits for the given seed
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            reportable_statuses: default_reportable_statuses().into_iter().collect(),
            max_concurrency: default_max_concurrency() as usize,
            dispatch_delay: Duration::from_millis(default_dispatch_delay()),
            request_timeout: Duration::from_millis(default_request_timeout()),
            deny_patterns: Vec::new(),
        }
    }
}

impl From<&CrawlerConfig> for CrawlSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            seed_url: config.seed_url.trim().to_string(),
            reportable_statuses: config.reportable_statuses.iter().copied().collect(),
            max_concurrency: config.max_concurrency as usize,
            dispatch_delay: Duration::from_millis(config.dispatch_delay),
            request_timeout: Duration::from_millis(config.request_timeout),
            deny_patterns: config.deny_patterns.clone(),
        }
    }
}

impl Config {
    /// Derives the traversal settings from this configuration
    pub fn crawl_settings(&self) -> CrawlSettings {
        CrawlSettings::from(&self.crawler)
    }
}

fn default_reportable_statuses() -> Vec<u16> {
    vec![404, 410, 500]
}

fn default_max_concurrency() -> u32 {
    2
}

fn default_dispatch_delay() -> u64 {
    500
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_max_redirects() -> u32 {
    10
}

fn default_crawler_name() -> String {
    "BrokenLinkChecker".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_json_path() -> String {
    "output.json".to_string()
}

fn default_filtered_path() -> String {
    "filtered_output.json".to_string()
}
