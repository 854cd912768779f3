//! Link record types
//!
//! A [`LinkRecord`] is the unit of output: one broken, non-HTML, or
//! unreachable link found during a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transport failure taxonomy carried in a record's `status` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorTag {
    /// Name resolution failed
    #[serde(rename = "DNSLookupError")]
    DnsLookup,

    /// Connect or read timed out
    #[serde(rename = "TimeoutError")]
    Timeout,

    /// Any other transport failure
    #[serde(rename = "UnhandledError")]
    Unhandled,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DnsLookup => "DNSLookupError",
            Self::Timeout => "TimeoutError",
            Self::Unhandled => "UnhandledError",
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DNSLookupError" => Ok(Self::DnsLookup),
            "TimeoutError" => Ok(Self::Timeout),
            "UnhandledError" => Ok(Self::Unhandled),
            other => Err(format!("unknown error tag '{}'", other)),
        }
    }
}

/// Status of a link record: an HTTP status code or a transport error tag
///
/// Serializes untagged, so JSON carries either `404` or `"DNSLookupError"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordStatus {
    Code(u16),
    Error(ErrorTag),
}

impl RecordStatus {
    /// Text form used for grouping and storage (`"404"`, `"TimeoutError"`)
    pub fn label(&self) -> String {
        match self {
            Self::Code(code) => code.to_string(),
            Self::Error(tag) => tag.as_str().to_string(),
        }
    }

    /// Parses a label produced by [`RecordStatus::label`]
    pub fn from_label(label: &str) -> Option<Self> {
        if let Ok(code) = label.parse::<u16>() {
            return Some(Self::Code(code));
        }
        label.parse::<ErrorTag>().ok().map(Self::Error)
    }

    /// The HTTP status code, if this is not a transport error
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Error(_) => None,
        }
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Error(tag) => f.write_str(tag.as_str()),
        }
    }
}

/// One output record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Page the link was found on, or the requested URL for the seed
    pub referer: String,

    /// Final URL actually fetched; set for external probes and failures
    #[serde(rename = "response", default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,

    pub status: RecordStatus,

    /// The URL that was requested
    pub link_url: String,

    /// Visible anchor text; empty when the anchor wrapped an image
    #[serde(default)]
    pub link_text: String,

    /// Last entry of the redirect chain, absent when no redirect was followed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,

    /// Enclosed image source, or the URL itself for non-HTML content
    #[serde(default)]
    pub link_img: String,
}
