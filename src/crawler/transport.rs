//! HTTP transport
//!
//! The crawl engine only sees the [`Transport`] trait. [`ReqwestTransport`]
//! is the production implementation: it follows redirects itself so the
//! full hop chain is known, and reads bodies only for HTML responses.

use crate::config::{Config, UserAgentConfig};
use crate::CheckerError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use url::Url;

/// A response obtained from the network, whatever its status
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL after all redirects
    pub final_url: Url,

    pub status: u16,

    /// Raw `Content-Type` header, if any
    pub content_type: Option<String>,

    /// Body text, only read for HTML responses
    pub body: Option<String>,

    /// Target of every redirect hop in order; the last entry is `final_url`
    pub redirect_chain: Vec<Url>,
}

impl FetchResponse {
    pub fn is_html(&self) -> bool {
        is_html_content_type(self.content_type.as_deref())
    }
}

/// Returns true if the content type starts with `text/html`
///
/// A missing header counts as non-HTML.
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

/// Coarse cause of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    DnsLookup,
    Timeout,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DnsLookup => "DNS lookup failed",
            Self::Timeout => "timed out",
            Self::Other => "request failed",
        };
        f.write_str(s)
    }
}

/// A fetch that produced no response
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn dns(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::DnsLookup, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }
}

/// Fetches one URL
///
/// Implementations must return `Ok` for every HTTP response, including
/// 4xx and 5xx, and `Err` only when no response was obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are disabled at the client; [`ReqwestTransport`] follows them.
///
/// # Example
///
/// ```no_run
/// use broken_link_checker::config::UserAgentConfig;
/// use broken_link_checker::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_redirects: usize,
}

impl ReqwestTransport {
    /// Creates a transport
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Identification sent with every request
    /// * `max_redirects` - Hops followed per fetch; 0 returns 3xx responses as is
    pub fn new(user_agent: &UserAgentConfig, max_redirects: u32) -> Result<Self, CheckerError> {
        Ok(Self {
            client: build_http_client(user_agent)?,
            max_redirects: max_redirects as usize,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CheckerError> {
        Self::new(&config.user_agent, config.crawler.max_redirects)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, TransportError> {
        let deadline = Instant::now() + timeout;
        let mut current = url.clone();
        let mut redirect_chain = Vec::new();
        let mut seen = HashSet::from([current.to_string()]);

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::timeout(format!(
                    "no response from {} within {:?}",
                    current, timeout
                )));
            }

            let response = self
                .client
                .get(current.clone())
                .timeout(remaining)
                .send()
                .await
                .map_err(|e| classify_reqwest_error(&e))?;

            let status = response.status();

            if status.is_redirection() && self.max_redirects > 0 {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);

                if let Some(location) = location {
                    let mut next = current.join(&location).map_err(|e| {
                        TransportError::other(format!(
                            "invalid redirect location '{}': {}",
                            location, e
                        ))
                    })?;
                    next.set_fragment(None);

                    if redirect_chain.len() >= self.max_redirects {
                        return Err(TransportError::other(format!(
                            "more than {} redirects starting at {}",
                            self.max_redirects, url
                        )));
                    }
                    if !seen.insert(next.to_string()) {
                        return Err(TransportError::other(format!("redirect loop at {}", next)));
                    }

                    tracing::trace!("{} redirected to {}", current, next);
                    redirect_chain.push(next.clone());
                    current = next;
                    continue;
                }
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let body = if is_html_content_type(content_type.as_deref()) {
                Some(
                    response
                        .text()
                        .await
                        .map_err(|e| classify_reqwest_error(&e))?,
                )
            } else {
                None
            };

            return Ok(FetchResponse {
                final_url: current,
                status: status.as_u16(),
                content_type,
                body,
                redirect_chain,
            });
        }
    }
}

fn classify_reqwest_error(error: &reqwest::Error) -> TransportError {
    let message = error_chain_message(error);
    if error.is_timeout() {
        return TransportError::timeout(message);
    }
    TransportError::new(classify_error_chain(error), message)
}

/// Walks an error and its sources looking for DNS or timeout causes
pub fn classify_error_chain(error: &(dyn StdError + 'static)) -> TransportErrorKind {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);

    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return TransportErrorKind::Timeout;
            }
        }

        let text = err.to_string().to_ascii_lowercase();
        if text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
        {
            return TransportErrorKind::DnsLookup;
        }
        if text.contains("timed out") {
            return TransportErrorKind::Timeout;
        }

        current = err.source();
    }

    TransportErrorKind::Other
}

fn error_chain_message(error: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(err) = source {
        parts.push(err.to_string());
        source = err.source();
    }
    parts.join(": ")
}
