//! Reader-proxy client: one GET per search or page read.
//!
//! The proxy fetches the target server-side and answers with markdown. A
//! non-success status or transport failure is a [`SearchError::Fetch`]; a
//! successful but empty body is passed through (and logged) so that callers
//! see "no results" rather than an error.

use crate::SearchError;
use crate::query::{SearchQuery, proxy_search_url};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use trawl_http::{HttpClient, RequestOpts};
use url::Url;

#[derive(Clone, Debug)]
pub struct ReaderClient {
    http: HttpClient,
    engine_url: String,
}

impl ReaderClient {
    /// ```no_run
    /// use std::time::Duration;
    /// use trawl_web::reader::ReaderClient;
    ///
    /// let client = ReaderClient::new(
    ///     "https://r.jina.ai/",
    ///     "https://www.google.com/search",
    ///     Duration::from_secs(30),
    /// )?;
    /// # Ok::<(), trawl_web::SearchError>(())
    /// ```
    pub fn new(reader_base: &str, engine_url: &str, timeout: Duration) -> Result<Self, SearchError> {
        let engine = Url::parse(engine_url).map_err(|e| SearchError::InvalidTarget {
            url: engine_url.to_string(),
            reason: e.to_string(),
        })?;
        let http = HttpClient::new(reader_base)?.with_timeout(timeout);
        Ok(Self {
            http,
            engine_url: engine.to_string(),
        })
    }

    /// The proxy URL a search for `query` would fetch.
    pub fn search_url(&self, query: &SearchQuery, num: Option<NonZeroU32>) -> String {
        proxy_search_url(self.http.base().as_str(), &self.engine_url, query, num)
    }

    /// Fetch the engine's result page for `query` as markdown.
    pub async fn search(
        &self,
        query: &SearchQuery,
        num: Option<NonZeroU32>,
    ) -> Result<String, SearchError> {
        let url = self.search_url(query, num);
        tracing::info!(target: "web.reader", query = %query, num = ?num, "reader.search.start");
        self.fetch(&url).await
    }

    /// Fetch an arbitrary page through the proxy as markdown.
    pub async fn read(&self, target: &str) -> Result<String, SearchError> {
        let page = parse_target(target)?;
        let url = format!("{}{}", self.http.base(), page);
        tracing::info!(target: "web.reader", %page, "reader.read.start");
        self.fetch(&url).await
    }

    async fn fetch(&self, url: &str) -> Result<String, SearchError> {
        let started = Instant::now();
        let body = match self.http.get_text(url, RequestOpts::absolute()).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(
                    target: "web.reader",
                    error = %err,
                    status = ?err.status(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "reader.fetch.failed"
                );
                return Err(err.into());
            }
        };

        if body.trim().is_empty() {
            tracing::warn!(target: "web.reader", "reader.fetch.empty_body");
        }
        tracing::info!(
            target: "web.reader",
            body_len = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reader.fetch.done"
        );
        Ok(body)
    }
}

fn parse_target(raw: &str) -> Result<Url, SearchError> {
    let invalid = |reason: String| SearchError::InvalidTarget {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}
