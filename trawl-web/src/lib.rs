//! Search and page reading through a markdown reader proxy.
//!
//! - [`query`]: search queries and the proxy URL they are sent through
//! - [`reader`]: the single-request proxy client
//! - [`extract`]: deduplicated, sorted result URLs from markdown
//! - [`results`]: structured hits (title, URL, snippet) from markdown

pub mod extract;
pub mod query;
pub mod reader;
pub mod results;

pub use extract::{Denylist, ExtractedUrlSet, extract_result_urls, extract_urls};
pub use query::SearchQuery;
pub use reader::ReaderClient;
pub use results::{HitFilter, SearchHit, parse_results};

use thiserror::Error;
use trawl_http::HttpError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("invalid URL `{url}`: {reason}")]
    InvalidTarget { url: String, reason: String },
    #[error("reader proxy request failed: {0}")]
    Fetch(#[from] HttpError),
}
