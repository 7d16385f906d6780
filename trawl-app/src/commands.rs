use crate::cli::{OutputFormat, ReadArgs, SearchArgs};
use anyhow::{Context, Result};
use std::io::Write;
use std::num::NonZeroU32;
use trawl_config::TrawlConfig;
use trawl_web::{Denylist, HitFilter, ReaderClient, SearchQuery, extract_urls, parse_results};

/// Run one search and write the rendering for `format` to `out`.
///
/// Zero results is a normal outcome: nothing is written for URL and detailed
/// output, `[]` for JSON.
pub async fn search<W: Write>(
    client: &ReaderClient,
    cfg: &TrawlConfig,
    query: &SearchQuery,
    args: &SearchArgs,
    out: &mut W,
) -> Result<()> {
    let num = args
        .num
        .or_else(|| cfg.search.default_num.and_then(NonZeroU32::new));
    let extra = &cfg.search.extra_denylist;

    let body = client
        .search(query, num)
        .await
        .with_context(|| format!("search for `{query}` failed"))?;

    match args.format() {
        OutputFormat::Urls => {
            let urls = extract_urls(&body, &Denylist::default().with_extra(extra));
            tracing::info!(target: "trawl", count = urls.len(), "search.urls");
            if !urls.is_empty() {
                writeln!(out, "{urls}")?;
            }
        }
        OutputFormat::Detailed => {
            let hits = parse_results(&body, &HitFilter::default().with_extra(extra));
            tracing::info!(target: "trawl", count = hits.len(), "search.hits");
            for hit in &hits {
                writeln!(out, "{hit}\n")?;
            }
        }
        OutputFormat::Json => {
            let hits = parse_results(&body, &HitFilter::default().with_extra(extra));
            tracing::info!(target: "trawl", count = hits.len(), "search.hits");
            serde_json::to_writer_pretty(&mut *out, &hits)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Fetch one page through the reader and write its markdown to `out`.
pub async fn read<W: Write>(client: &ReaderClient, args: &ReadArgs, out: &mut W) -> Result<()> {
    let page = client
        .read(&args.url)
        .await
        .with_context(|| format!("reading `{}` failed", args.url))?;
    out.write_all(page.as_bytes())?;
    if !page.ends_with('\n') && !page.is_empty() {
        writeln!(out)?;
    }
    Ok(())
}
