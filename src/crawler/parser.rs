//! HTML link extraction
//!
//! This module handles parsing HTML content to extract anchors:
//! - The raw `href` of every `<a href>`
//! - The anchor's visible text, whitespace-collapsed
//! - The `src` of the first image the anchor wraps, if any

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One anchor element as found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The `href` attribute, unresolved
    pub href: String,

    /// Visible text with runs of whitespace collapsed to one space
    pub text: String,

    /// Source of the enclosed image, resolved against the page URL when possible
    pub image_src: Option<String>,
}

/// Turns an HTML document into anchors
///
/// Implementations must not fail: unparseable markup yields fewer anchors.
pub trait LinkExtractor: Send + Sync {
    fn extract_anchors(&self, html: &str, base_url: &Url) -> Vec<Anchor>;
}

/// [`LinkExtractor`] backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_anchors(&self, html: &str, base_url: &Url) -> Vec<Anchor> {
        parse_anchors(html, base_url)
    }
}

/// Parses HTML content and extracts every `<a href>` in document order
///
/// # Example
///
/// ```
/// use broken_link_checker::crawler::parse_anchors;
/// use url::Url;
///
/// let html = r#"<a href="/about">  About
///     us </a><a href="/"><img src="logo.png"></a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let anchors = parse_anchors(html, &base);
///
/// assert_eq!(anchors[0].text, "About us");
/// assert_eq!(anchors[1].image_src.as_deref(), Some("https://example.com/logo.png"));
/// ```
pub fn parse_anchors(html: &str, base_url: &Url) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let mut anchors = Vec::new();

    let (Ok(a_selector), Ok(img_selector)) =
        (Selector::parse("a[href]"), Selector::parse("img[src]"))
    else {
        return anchors;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        anchors.push(Anchor {
            href: href.to_string(),
            text: collapse_whitespace(element),
            image_src: enclosed_image(element, &img_selector, base_url),
        });
    }

    anchors
}

fn collapse_whitespace(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn enclosed_image(element: ElementRef<'_>, selector: &Selector, base_url: &Url) -> Option<String> {
    let src = element
        .select(selector)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())?;

    // Keep the raw value when it cannot be resolved
    Some(
        base_url
            .join(src)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| src.to_string()),
    )
}
