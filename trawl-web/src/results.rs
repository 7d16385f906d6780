//! Structured search hits (title, URL, snippet) from reader markdown.
//!
//! The reader renders each organic result as a heading link on its own line,
//! `[### Title ![img](blob:…) Site › path](https://…)`, followed by a few
//! lines of site chrome and, usually, the snippet. Hits keep the engine's
//! display order.

use crate::extract::{Denylist, strip_suffixes};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Hosts whose result headings are engine chrome rather than organic hits.
pub const HIT_DOMAIN_DENYLIST: &[&str] = &[
    "google.com",
    "gstatic.com",
    "ytimg.com",
    "googleapis.com",
    "googleusercontent.com",
];

/// Lines inspected after a heading when looking for its snippet.
const DESCRIPTION_WINDOW: usize = 9;
const MIN_DESCRIPTION_CHARS: usize = 30;

// The title may itself contain `]`, so the greedy group backs off to the last `](http`.
static RESULT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[### (.+)\]\((https?://[^)]+)\)$").expect("result header pattern")
});
static TITLE_IMAGE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*!\[.*$").expect("title image pattern"));
static TITLE_BREADCRUMB_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\\›»].*$").expect("breadcrumb pattern"));
static IMAGE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(png|jpg|gif|svg)$").expect("image url pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static BARE_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9.-]+\.[a-z]{2,}$").expect("bare domain pattern"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^_]+)_").expect("emphasis pattern"));
static READ_MORE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Read more\].*$").expect("read more pattern"));
static LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][a-z]{2} \d{1,2}, \d{4} — ").expect("leading date pattern")
});

/// Decides which result headings are dropped.
///
/// Narrower than the link [`Denylist`] used for URL extraction: video pages
/// and hosts such as `www.svgrepo.com` are real results here. Only the
/// engine's own hosts, `blob:` URLs and links ending in an image extension
/// are dropped, plus any configured entries.
///
/// ```
/// use trawl_web::results::HitFilter;
///
/// let filter = HitFilter::default().with_extra(["pinterest.com"]);
/// assert!(filter.is_denied("https://www.pinterest.com/pin/1/"));
/// assert!(filter.is_denied("https://example.com/logo.SVG"));
/// assert!(!filter.is_denied("https://www.youtube.com/watch?v=abc"));
/// assert!(!filter.is_denied("https://www.svgrepo.com/"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitFilter {
    domains: Denylist,
}

impl Default for HitFilter {
    fn default() -> Self {
        Self {
            domains: Denylist::from_entries(HIT_DOMAIN_DENYLIST),
        }
    }
}

impl HitFilter {
    /// Append substring entries; blank entries are ignored.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.domains = self.domains.with_extra(extra);
        self
    }

    pub fn is_denied(&self, url: &str) -> bool {
        self.domains.is_denied(url) || url.starts_with("blob:") || IMAGE_URL.is_match(url)
    }
}

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    /// Result URL with fragment and query removed.
    pub url: String,
    /// Snippet shown under the result; empty when none was found.
    pub description: String,
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {}", self.title)?;
        write!(f, "{}", self.url)?;
        if !self.description.is_empty() {
            write!(f, "\n{}", self.description)?;
        }
        Ok(())
    }
}

/// Parse result headings and their snippets out of reader markdown.
///
/// Headings whose URL is denied by `filter`, whose cleaned title is empty, or
/// whose cleaned URL was already emitted are skipped.
pub fn parse_results(content: &str, filter: &HitFilter) -> Vec<SearchHit> {
    let lines: Vec<&str> = content.lines().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut hits = Vec::new();

    for (i, &line) in lines.iter().enumerate() {
        let Some(caps) = RESULT_HEADER.captures(line) else {
            continue;
        };
        let (Some(raw_title), Some(raw_url)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let raw_url = raw_url.as_str();
        let title = clean_title(raw_title.as_str());
        let url = strip_suffixes(raw_url);

        if filter.is_denied(raw_url) || title.is_empty() || seen.contains(url) {
            continue;
        }
        seen.insert(url);

        let end = (i + 1 + DESCRIPTION_WINDOW).min(lines.len());
        let description = find_description(&lines[i + 1..end]);

        tracing::trace!(target: "web.results", %url, has_description = !description.is_empty(), "results.hit");
        hits.push(SearchHit {
            title,
            url: url.to_string(),
            description,
        });
    }

    hits
}

fn clean_title(raw: &str) -> String {
    let title = TITLE_IMAGE_TAIL.replace(raw, "");
    let title = TITLE_BREADCRUMB_TAIL.replace(&title, "");
    let title = WHITESPACE_RUN.replace_all(&title, " ");
    title.trim().to_string()
}

fn find_description(window: &[&str]) -> String {
    for line in window {
        let line = line.trim();
        if RESULT_HEADER.is_match(line) || line.starts_with("##") {
            break;
        }
        if is_noise(line) {
            continue;
        }

        let desc = EMPHASIS.replace_all(line, "$1");
        let desc = READ_MORE_TAIL.replace(&desc, "");
        let desc = LEADING_DATE.replace(&desc, "");
        let desc = desc.trim();
        if desc.chars().count() > MIN_DESCRIPTION_CHARS {
            return desc.to_string();
        }
    }
    String::new()
}

fn is_noise(line: &str) -> bool {
    line.starts_with('[')
        || line.starts_with("http")
        || line.starts_with("![")
        || line.starts_with('*')
        || line.to_lowercase().contains("feedback")
        || BARE_DOMAIN.is_match(line)
        || line.chars().count() < MIN_DESCRIPTION_CHARS
}
