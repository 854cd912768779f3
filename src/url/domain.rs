use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// The network authority of a URL: scheme, lowercase host, and explicit port
///
/// Default ports are dropped by the URL parser, so `https://a.test:443/` and
/// `https://a.test/` share an authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authority {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Authority {
    /// Extracts the authority from a parsed URL
    ///
    /// Returns `None` for URLs without a host (`mailto:`, `data:` ...).
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use broken_link_checker::url::Authority;
    ///
    /// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
    /// let authority = Authority::from_url(&url).unwrap();
    /// assert_eq!(authority.host(), "example.com");
    /// assert_eq!(authority.to_string(), "https://example.com:8443");
    /// ```
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str().filter(|h| !h.is_empty())?;
        Some(Self {
            scheme: url.scheme().to_string(),
            host: host.to_lowercase(),
            port: url.port(),
        })
    }

    /// Parses a URL string and extracts its authority
    pub fn parse(url: &str) -> UrlResult<Self> {
        let parsed = Url::parse(url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
        Self::from_url(&parsed).ok_or(UrlError::MissingHost)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}
