use crate::ConfigError;
use regex::RegexSet;

/// Compiled deny patterns
///
/// A candidate link matching any pattern is dropped during discovery, for
/// internal and external links alike. Patterns are unanchored regexes
/// searched anywhere in the absolute URL.
#[derive(Debug, Clone)]
pub struct DenyList {
    patterns: RegexSet,
}

impl DenyList {
    /// Compiles the given patterns
    ///
    /// # Examples
    ///
    /// ```
    /// use broken_link_checker::url::DenyList;
    ///
    /// let deny = DenyList::new(&[r"/logout".to_string(), r"\.zip$".to_string()]).unwrap();
    /// assert!(deny.is_denied("https://example.com/logout?next=/"));
    /// assert!(deny.is_denied("https://example.com/files/a.zip"));
    /// assert!(!deny.is_denied("https://example.com/about"));
    /// ```
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns =
            RegexSet::new(patterns).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        Ok(Self { patterns })
    }

    /// A deny list that matches nothing
    pub fn empty() -> Self {
        Self {
            patterns: RegexSet::empty(),
        }
    }

    /// Returns true if the URL matches any deny pattern
    pub fn is_denied(&self, url: &str) -> bool {
        self.patterns.is_match(url)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for DenyList {
    fn default() -> Self {
        Self::empty()
    }
}
