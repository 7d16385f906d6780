//! Search queries and the reader-proxy URL they are sent through.

use crate::SearchError;
use std::fmt;
use std::num::NonZeroU32;
use url::form_urlencoded;

/// A free-text query, operators included (`site:`, `filetype:`, `-term`,
/// `"exact phrase"`). Only leading/trailing whitespace is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// ```
    /// use trawl_web::query::SearchQuery;
    ///
    /// let q = SearchQuery::new("  site:docs.rs serde  ").unwrap();
    /// assert_eq!(q.as_str(), "site:docs.rs serde");
    /// assert!(SearchQuery::new("   ").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, SearchError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form-urlencoded value for the `q` parameter; spaces become `+`.
    pub fn encoded(&self) -> String {
        form_urlencoded::byte_serialize(self.0.as_bytes()).collect()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `<reader_base><engine_url>?q=<query>[&num=<n>]`, the one URL fetched per search.
///
/// ```
/// use std::num::NonZeroU32;
/// use trawl_web::query::{SearchQuery, proxy_search_url};
///
/// let q = SearchQuery::new("rust async").unwrap();
/// let url = proxy_search_url(
///     "https://r.jina.ai/",
///     "https://www.google.com/search",
///     &q,
///     NonZeroU32::new(20),
/// );
/// assert_eq!(url, "https://r.jina.ai/https://www.google.com/search?q=rust+async&num=20");
/// ```
pub fn proxy_search_url(
    reader_base: &str,
    engine_url: &str,
    query: &SearchQuery,
    num: Option<NonZeroU32>,
) -> String {
    let sep = if engine_url.contains('?') { '&' } else { '?' };
    let mut url = format!("{reader_base}{engine_url}{sep}q={}", query.encoded());
    if let Some(n) = num {
        url.push_str(&format!("&num={n}"));
    }
    url
}
