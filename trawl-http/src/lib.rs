//! Minimal text-oriented HTTP client with safe logging.
//!
//! - Base-relative paths or absolute URLs, one client-wide timeout
//! - Optional *raw* request/response logging via `TRAWL_HTTP_RAW=1`
//! - One attempt per request: failures surface to the caller as [`HttpError`]
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), trawl_http::HttpError> {
//! let client = trawl_http::HttpClient::new("https://r.jina.ai/")?;
//! let page: String = client
//!     .get_text("https://example.com/", trawl_http::RequestOpts::absolute())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `TRAWL_HTTP_RAW=1`.

use reqwest::header::USER_AGENT;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "TRAWL_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

const DEFAULT_USER_AGENT: &str = concat!("trawl/", env!("CARGO_PKG_VERSION"));

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a curl command that repeats the request.
fn make_curl(method: &Method, url: &Url) -> String {
    format!(
        "curl -X{method} -H '{USER_AGENT}: {DEFAULT_USER_AGENT}' '{}'",
        url.as_str().replace('\'', r"'\''")
    )
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for [`HttpError::Api`], `None` for failures that never got a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Request Options
// ==============================

/// Per-request options for the HTTP client.
///
/// ```
/// use trawl_http::RequestOpts;
///
/// assert!(!RequestOpts::default().allow_absolute);
/// assert!(RequestOpts::absolute().allow_absolute);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestOpts {
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

impl RequestOpts {
    /// Options that accept an absolute URL in place of a base-relative path.
    pub fn absolute() -> Self {
        Self {
            allow_absolute: true,
            ..Default::default()
        }
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use trawl_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://r.jina.ai/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(30),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use trawl_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://r.jina.ai/")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET a resource and return its body decoded as (lossy) UTF-8 text.
    ///
    /// Non-2xx responses become [`HttpError::Api`]; the body of a successful
    /// response is returned even when empty.
    pub async fn get_text(&self, path: &str, opts: RequestOpts) -> Result<String, HttpError> {
        let url = self.resolve(path, opts)?;
        let method = Method::GET;
        let timeout = self.default_timeout;

        // ----- Build request -----
        let rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout)
            .header(USER_AGENT, DEFAULT_USER_AGENT);

        // ----- Request logging (pre-send) -----
        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());
        let (host_path, query) = split_url(&url);
        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%host_path,
            query=?query,
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?headers,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%req_hdr_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: req_hdr_id.to_string(),
        })
    }

    fn resolve(&self, path: &str, opts: RequestOpts) -> Result<Url, HttpError> {
        let absolute = if opts.allow_absolute {
            Url::parse(path).ok()
        } else {
            None
        };
        match absolute {
            Some(abs) => Ok(abs),
            None => self
                .base
                .join(path)
                .map_err(|e| HttpError::Url(e.to_string())),
        }
    }
}

// ==============================
// Helpers
// ==============================

fn extract_error_message(body: &[u8]) -> String {
    // {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct Nested {
        error: NestedDetail,
    }
    #[derive(Deserialize)]
    struct NestedDetail {
        message: String,
    }

    // {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Nested>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let snip = String::from_utf8_lossy(body);
    match snip.char_indices().nth(SNIPPET_MAX) {
        Some((cut, _)) => format!("{}...", &snip[..cut]),
        None => snip.into_owned(),
    }
}

/// "host[:port]/path" and decoded query pairs, for logging.
fn split_url(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = match url.port() {
        Some(port) => format!("{}:{}{}", url.host_str().unwrap_or("-"), port, url.path()),
        None => format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
    };
    let query = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    (host_path, query)
}
