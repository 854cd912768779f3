use url::Url;

/// Computes the dedup key of a URL
///
/// Two links that would fetch the same resource map to the same key, so the
/// crawl dispatches each resource at most once.
///
/// # Normalization Steps
///
/// 1. Lowercase scheme and host, drop default ports (done by the parser)
/// 2. Remove the fragment
/// 3. Sort query parameters by key, keeping the order of equal keys
/// 4. Remove an empty query string (trailing `?`)
///
/// The path is kept as-is apart from dot-segment removal by the parser;
/// `/page` and `/page/` are different resources.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use broken_link_checker::url::normalize_url;
///
/// let url = Url::parse("HTTPS://Example.COM:443/a/../b?z=1&a=2#top").unwrap();
/// assert_eq!(normalize_url(&url), "https://example.com/b?a=2&z=1");
/// ```
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if params.is_empty() {
            url.set_query(None);
        } else {
            params.sort_by(|a, b| a.0.cmp(&b.0));
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    url.into()
}
