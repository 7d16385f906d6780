//! Result URL extraction from reader-proxy markdown.
//!
//! A pure pipeline over the response text: find `(https://…)` link targets,
//! drop anything on the [`Denylist`], cut fragment and query suffixes, then
//! dedupe and sort. Empty or link-free input yields an empty set.

use regex::Regex;
use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;
use std::sync::LazyLock;

/// Substrings that mark a link as engine chrome rather than a result.
pub const BUILTIN_DENYLIST: &[&str] = &[
    // the engine itself
    "google.com",
    // inline binary objects
    "blob:",
    // static assets and image hosting
    "gstatic.com",
    "ytimg.com",
    "googleapis.com",
    "googleusercontent.com",
    ".png",
    ".jpg",
    ".svg",
    ".gif",
    // direct video pages
    "youtube.com/watch",
];

static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((https://[^)\s]+)\)").expect("link target pattern"));

/// Case-insensitive substring denylist.
///
/// ```
/// use trawl_web::extract::Denylist;
///
/// let deny = Denylist::default().with_extra(["pinterest.com"]);
/// assert!(deny.is_denied("https://www.Pinterest.com/pin/1"));
/// assert!(deny.is_denied("https://fonts.gstatic.com/s/roboto.woff"));
/// assert!(!deny.is_denied("https://doc.rust-lang.org/book/"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    entries: Vec<String>,
}

impl Default for Denylist {
    fn default() -> Self {
        Self {
            entries: BUILTIN_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Denylist {
    /// A list holding only `entries`, without the built-ins.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: Vec::new(),
        }
        .with_extra(entries)
    }

    /// Append entries on top of the built-ins. Blank entries are ignored.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in extra {
            let entry = entry.as_ref().trim().to_ascii_lowercase();
            if !entry.is_empty() && !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
        self
    }

    pub fn is_denied(&self, candidate: &str) -> bool {
        let lower = candidate.to_ascii_lowercase();
        self.entries.iter().any(|entry| lower.contains(entry.as_str()))
    }
}

/// Unique result URLs in ascending lexical order.
///
/// `Display` renders one URL per line with no trailing newline; an empty set
/// renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedUrlSet(BTreeSet<String>);

impl ExtractedUrlSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

impl IntoIterator for ExtractedUrlSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ExtractedUrlSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, url) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(url)?;
        }
        Ok(())
    }
}

/// Cut everything from the first `#` or `?`.
pub fn strip_suffixes(url: &str) -> &str {
    match url.find(['#', '?']) {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Extract result URLs from reader markdown using `denylist`.
///
/// ```
/// use trawl_web::extract::{Denylist, extract_urls};
///
/// let text = "Link ](https://example.com/a?utm=1#sec) more ](https://example.com/a) \
///             ](https://gstatic.com/x.png)";
/// let urls = extract_urls(text, &Denylist::default());
/// assert_eq!(urls.into_vec(), vec!["https://example.com/a"]);
/// ```
pub fn extract_urls(text: &str, denylist: &Denylist) -> ExtractedUrlSet {
    let urls = LINK_TARGET
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|candidate| !denylist.is_denied(candidate))
        .map(strip_suffixes)
        .filter(|url| url.len() > "https://".len())
        .map(str::to_string)
        .collect();
    ExtractedUrlSet(urls)
}

/// [`extract_urls`] with the built-in denylist.
pub fn extract_result_urls(text: &str) -> ExtractedUrlSet {
    extract_urls(text, &Denylist::default())
}
