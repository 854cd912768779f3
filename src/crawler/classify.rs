//! Response and transport-error classification
//!
//! | Condition | Result |
//! |-----------|--------|
//! | status in the reportable set | record with that status, no extraction |
//! | content type not `text/html` | non-HTML record, no extraction |
//! | HTML, internal task | extract links |
//! | HTML, external probe | reachable, nothing further |
//!
//! Transport failures always become a record tagged with [`ErrorTag`].

use crate::crawler::task::{FetchTask, Scope};
use crate::crawler::transport::{FetchResponse, TransportError, TransportErrorKind};
use crate::output::{ErrorTag, LinkRecord, RecordStatus};
use std::collections::BTreeSet;

/// Decision for one completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Emit this record and stop
    Record(LinkRecord),

    /// Hand the body to the link extractor
    ExtractLinks,

    /// External page answered with HTML; single-hop probe ends here
    Reachable,
}

/// Classifies a response obtained for `task`
pub fn classify_response(
    task: &FetchTask,
    response: &FetchResponse,
    reportable: &BTreeSet<u16>,
) -> Classification {
    let redirect_url = response.redirect_chain.last().map(|url| url.to_string());
    let final_url = response.final_url.to_string();
    let response_url = match task.scope {
        Scope::ExternalProbe => Some(final_url.clone()),
        Scope::Internal => None,
    };

    if reportable.contains(&response.status) {
        return Classification::Record(LinkRecord {
            referer: task.referer(),
            response_url,
            status: RecordStatus::Code(response.status),
            link_url: task.url.to_string(),
            link_text: task.meta.link_text.clone(),
            redirect_url,
            link_img: task.meta.link_img.clone(),
        });
    }

    if !response.is_html() {
        return Classification::Record(LinkRecord {
            referer: task.referer(),
            response_url,
            status: RecordStatus::Code(response.status),
            link_url: final_url.clone(),
            link_text: String::new(),
            redirect_url,
            link_img: final_url,
        });
    }

    match task.scope {
        Scope::Internal => Classification::ExtractLinks,
        Scope::ExternalProbe => Classification::Reachable,
    }
}

/// Maps a transport failure kind onto the record taxonomy
pub fn error_tag(kind: TransportErrorKind) -> ErrorTag {
    match kind {
        TransportErrorKind::DnsLookup => ErrorTag::DnsLookup,
        TransportErrorKind::Timeout => ErrorTag::Timeout,
        TransportErrorKind::Other => ErrorTag::Unhandled,
    }
}

/// Builds the record for a fetch that produced no response
///
/// Text and image come from the referring page, never from the failed fetch.
pub fn classify_failure(task: &FetchTask, error: &TransportError) -> LinkRecord {
    let requested = task.url.to_string();
    LinkRecord {
        referer: task.referer(),
        response_url: Some(requested.clone()),
        status: RecordStatus::Error(error_tag(error.kind)),
        link_url: requested,
        link_text: task.meta.link_text.clone(),
        redirect_url: None,
        link_img: task.meta.link_img.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::task::LinkMeta;
    use url::Url;

    fn reportable() -> BTreeSet<u16> {
        [404, 410, 500].into_iter().collect()
    }

    fn task(url: &str, scope: Scope) -> FetchTask {
        FetchTask::new(
            Url::parse(url).unwrap(),
            LinkMeta {
                referer: Some("https://example.test/".to_string()),
                link_text: "Docs".to_string(),
                link_img: String::new(),
            },
            scope,
        )
    }

    fn response(url: &str, status: u16, content_type: Option<&str>) -> FetchResponse {
        FetchResponse {
            final_url: Url::parse(url).unwrap(),
            status,
            content_type: content_type.map(str::to_string),
            body: None,
            redirect_chain: Vec::new(),
        }
    }

    #[test]
    fn test_reportable_status_record() {
        let task = task("https://example.test/missing", Scope::Internal);
        let resp = response("https://example.test/missing", 404, Some("text/html"));

        let Classification::Record(record) = classify_response(&task, &resp, &reportable()) else {
            panic!("expected record");
        };
        assert_eq!(record.status, RecordStatus::Code(404));
        assert_eq!(record.link_url, "https://example.test/missing");
        assert_eq!(record.referer, "https://example.test/");
        assert_eq!(record.link_text, "Docs");
        assert_eq!(record.redirect_url, None);
        assert_eq!(record.response_url, None);
    }

    #[test]
    fn test_reportable_after_redirect_keeps_requested_url() {
        let task = task("https://example.test/old", Scope::Internal);
        let mut resp = response("https://example.test/new", 410, None);
        resp.redirect_chain = vec![Url::parse("https://example.test/new").unwrap()];

        let Classification::Record(record) = classify_response(&task, &resp, &reportable()) else {
            panic!("expected record");
        };
        assert_eq!(record.link_url, "https://example.test/old");
        assert_eq!(record.redirect_url.as_deref(), Some("https://example.test/new"));
    }

    #[test]
    fn test_non_html_record() {
        let task = task("https://example.test/report.pdf", Scope::Internal);
        let resp = response("https://example.test/report.pdf", 200, Some("application/pdf"));

        let Classification::Record(record) = classify_response(&task, &resp, &reportable()) else {
            panic!("expected record");
        };
        assert_eq!(record.status, RecordStatus::Code(200));
        assert_eq!(record.link_text, "");
        assert_eq!(record.link_url, "https://example.test/report.pdf");
        assert_eq!(record.link_img, "https://example.test/report.pdf");
    }

    #[test]
    fn test_missing_content_type_is_non_html() {
        let task = task("https://example.test/raw", Scope::Internal);
        let resp = response("https://example.test/raw", 200, None);
        assert!(matches!(
            classify_response(&task, &resp, &reportable()),
            Classification::Record(_)
        ));
    }

    #[test]
    fn test_internal_html_extracts_links() {
        let task = task("https://example.test/a", Scope::Internal);
        let resp = response("https://example.test/a", 200, Some("text/html; charset=utf-8"));
        assert_eq!(
            classify_response(&task, &resp, &reportable()),
            Classification::ExtractLinks
        );
    }

    #[test]
    fn test_external_html_is_single_hop() {
        let task = task("https://other.test/page", Scope::ExternalProbe);
        let resp = response("https://other.test/page", 200, Some("text/html"));
        assert_eq!(
            classify_response(&task, &resp, &reportable()),
            Classification::Reachable
        );
    }

    #[test]
    fn test_external_record_carries_response_url() {
        let task = task("https://other.test/gone", Scope::ExternalProbe);
        let resp = response("https://other.test/gone", 500, Some("text/html"));

        let Classification::Record(record) = classify_response(&task, &resp, &reportable()) else {
            panic!("expected record");
        };
        assert_eq!(record.response_url.as_deref(), Some("https://other.test/gone"));
    }

    #[test]
    fn test_unlisted_error_status_is_not_reported() {
        let task = task("https://example.test/forbidden", Scope::Internal);
        let resp = response("https://example.test/forbidden", 403, Some("text/html"));
        assert_eq!(
            classify_response(&task, &resp, &reportable()),
            Classification::ExtractLinks
        );
    }

    #[test]
    fn test_failure_record_uses_referring_metadata() {
        let mut task = task("https://gone.test/img", Scope::ExternalProbe);
        task.meta.link_text = String::new();
        task.meta.link_img = "https://example.test/logo.png".to_string();

        let record = classify_failure(&task, &TransportError::dns("no such host"));
        assert_eq!(record.status, RecordStatus::Error(ErrorTag::DnsLookup));
        assert_eq!(record.link_url, "https://gone.test/img");
        assert_eq!(record.response_url.as_deref(), Some("https://gone.test/img"));
        assert_eq!(record.link_text, "");
        assert_eq!(record.link_img, "https://example.test/logo.png");
        assert_eq!(record.referer, "https://example.test/");
    }

    #[test]
    fn test_error_tags() {
        assert_eq!(error_tag(TransportErrorKind::DnsLookup), ErrorTag::DnsLookup);
        assert_eq!(error_tag(TransportErrorKind::Timeout), ErrorTag::Timeout);
        assert_eq!(error_tag(TransportErrorKind::Other), ErrorTag::Unhandled);
    }
}
