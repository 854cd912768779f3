//! Fetch tasks and the metadata propagated from the referring page

use crate::state::TaskState;
use crate::CheckerError;
use url::Url;

/// Whether a task is part of the crawl or a one-shot reachability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Same authority as the seed; HTML responses are mined for more links
    Internal,

    /// Different authority; fetched once, never mined
    ExternalProbe,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::ExternalProbe => "external-probe",
        }
    }
}

/// What the referring page said about a link
///
/// Attached when the task is created and never re-derived from the fetch
/// itself, so failed fetches still report what the referring page showed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMeta {
    /// Final URL of the page the link was found on; `None` for the seed
    pub referer: Option<String>,

    /// Whitespace-collapsed anchor text, empty for image links
    pub link_text: String,

    /// Resolved source of the enclosed image, empty for text links
    pub link_img: String,
}

/// A pending or in-flight request
#[derive(Debug, Clone)]
pub struct FetchTask {
    pub url: Url,
    pub meta: LinkMeta,
    pub scope: Scope,
    state: TaskState,
}

impl FetchTask {
    /// Creates a queued task
    pub fn new(url: Url, meta: LinkMeta, scope: Scope) -> Self {
        Self {
            url,
            meta,
            scope,
            state: TaskState::Queued,
        }
    }

    /// The internal task for the seed URL
    pub fn seed(url: Url) -> Self {
        Self::new(url, LinkMeta::default(), Scope::Internal)
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Moves the task to `next`, rejecting moves the lifecycle forbids
    pub fn advance(&mut self, next: TaskState) -> Result<(), CheckerError> {
        self.state = self.state.transition(next)?;
        Ok(())
    }

    /// Referer to report: the referring page, or the request URL for the seed
    pub fn referer(&self) -> String {
        self.meta
            .referer
            .clone()
            .unwrap_or_else(|| self.url.to_string())
    }

    pub fn is_internal(&self) -> bool {
        self.scope == Scope::Internal
    }
}
