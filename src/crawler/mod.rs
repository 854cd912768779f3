//! Crawler module: the traversal engine
//!
//! This module contains the core crawling logic, including:
//! - The transport seam and its reqwest implementation
//! - HTML anchor extraction and link discovery
//! - Response and transport-error classification
//! - Frontier, dedup and dispatch pacing
//! - Overall crawl coordination

mod classify;
mod coordinator;
mod discovery;
mod parser;
mod scheduler;
mod task;
mod transport;

pub use classify::{classify_failure, classify_response, error_tag, Classification};
pub use coordinator::{Coordinator, CrawlReport, FetchOutcome};
pub use discovery::{discover, link_meta, Discovery};
pub use parser::{parse_anchors, Anchor, HtmlLinkExtractor, LinkExtractor};
pub use scheduler::{ScheduledFetch, Scheduler};
pub use task::{FetchTask, LinkMeta, Scope};
pub use transport::{
    build_http_client, classify_error_chain, is_html_content_type, FetchResponse,
    ReqwestTransport, Transport, TransportError, TransportErrorKind,
};
