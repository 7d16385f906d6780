//! Shared constants and observability helpers for the trawl crates.
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - default endpoints for the reader proxy and the target search engine
//!
//! ```rust
//! use trawl_common::{DEFAULT_ENGINE_URL, DEFAULT_READER_BASE};
//!
//! assert!(DEFAULT_READER_BASE.ends_with('/'));
//! assert!(DEFAULT_ENGINE_URL.starts_with("https://"));
//! ```

pub mod observability;

/// Reader proxy base; a target URL appended to it is fetched server-side and
/// rendered as markdown.
pub const DEFAULT_READER_BASE: &str = "https://r.jina.ai/";

/// Search endpoint of the target engine, placed behind the reader base.
pub const DEFAULT_ENGINE_URL: &str = "https://www.google.com/search";

/// Per-request timeout applied when configuration does not override it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
