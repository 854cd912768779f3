//! URL handling module
//!
//! This module is the URL Classifier of the crawler: absolute-URL validation,
//! internal/external scoping against the seed authority, href resolution,
//! dedup normalization, and deny-pattern matching.
//!
//! Everything here is pure. Malformed input yields `false`/`None`, never an
//! error the crawl has to handle.

mod domain;
mod matcher;
mod normalize;

use url::Url;

// Re-export main types and functions
pub use domain::Authority;
pub use matcher::DenyList;
pub use normalize::normalize_url;

/// Returns true if the candidate is an absolute URL with a scheme and a
/// non-empty authority
///
/// Surrounding whitespace is ignored; whitespace inside the candidate makes
/// it invalid.
///
/// # Examples
///
/// ```
/// use broken_link_checker::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/page"));
/// assert!(is_valid_url("  http://example.com  "));
/// assert!(!is_valid_url("/relative/page"));
/// assert!(!is_valid_url("mailto:someone@example.com"));
/// assert!(!is_valid_url("not a url"));
/// ```
pub fn is_valid_url(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
        return false;
    }

    match Url::parse(candidate) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}

/// Returns true if the candidate's authority is exactly the seed authority
///
/// Scheme, host, and port must all match; subdomains are external.
///
/// # Examples
///
/// ```
/// use broken_link_checker::url::{is_internal, Authority};
///
/// let seed = Authority::parse("https://example.com/").unwrap();
/// assert!(is_internal("https://example.com/about", &seed));
/// assert!(!is_internal("https://blog.example.com/", &seed));
/// assert!(!is_internal("not a url", &seed));
/// ```
pub fn is_internal(candidate: &str, seed_authority: &Authority) -> bool {
    if !is_valid_url(candidate) {
        return false;
    }

    Url::parse(candidate.trim())
        .ok()
        .and_then(|url| Authority::from_url(&url))
        .is_some_and(|authority| &authority == seed_authority)
}

/// Resolves an href found on a page into an absolute, fetchable URL
///
/// Returns `None` when the href contains inner whitespace, cannot be joined
/// with the page URL, or does not yield a valid absolute URL (for example
/// `mailto:` or `javascript:` links), or whose scheme is not HTTP(S). The
/// fragment is dropped because it is never sent to the server.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.chars().any(char::is_whitespace) {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);

    let fetchable = matches!(resolved.scheme(), "http" | "https");
    (fetchable && is_valid_url(resolved.as_str())).then_some(resolved)
}
