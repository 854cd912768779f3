//! Link discovery: turns an extracted anchor into a candidate fetch task

use crate::crawler::parser::Anchor;
use crate::crawler::task::{FetchTask, LinkMeta, Scope};
use crate::url::{resolve_href, Authority, DenyList};
use url::Url;

/// What became of one anchor
#[derive(Debug, Clone)]
pub enum Discovery {
    /// A task ready to be offered to the frontier
    Candidate(FetchTask),

    /// The href did not resolve to a valid absolute URL
    Rejected,

    /// The resolved URL matched a deny pattern
    Denied(Url),
}

/// Builds the propagated metadata for an anchor found on `page_url`
///
/// Image links carry the image source and no text; text links carry the
/// text and no image.
pub fn link_meta(anchor: &Anchor, page_url: &Url) -> LinkMeta {
    let (link_text, link_img) = match &anchor.image_src {
        Some(src) => (String::new(), src.clone()),
        None => (anchor.text.clone(), String::new()),
    };

    LinkMeta {
        referer: Some(page_url.to_string()),
        link_text,
        link_img,
    }
}

/// Resolves, validates and scopes one anchor found on `page_url`
pub fn discover(anchor: &Anchor, page_url: &Url, seed: &Authority, deny: &DenyList) -> Discovery {
    let Some(url) = resolve_href(page_url, &anchor.href) else {
        return Discovery::Rejected;
    };

    if deny.is_denied(url.as_str()) {
        return Discovery::Denied(url);
    }

    let scope = match Authority::from_url(&url) {
        Some(authority) if &authority == seed => Scope::Internal,
        _ => Scope::ExternalProbe,
    };

    Discovery::Candidate(FetchTask::new(url, link_meta(anchor, page_url), scope))
}
