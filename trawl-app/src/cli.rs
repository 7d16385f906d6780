use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::num::NonZeroU32;
use std::path::PathBuf;
use trawl_web::SearchQuery;

#[derive(Debug, Parser)]
#[command(
    name = "trawl",
    version,
    about = "Search Google and read pages through a markdown reader proxy"
)]
pub struct Cli {
    /// Config file (defaults to the per-user trawl.yaml when present)
    #[arg(long, global = true, env = "TRAWL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse the process arguments, exiting on usage errors.
    pub fn parse_args() -> Self {
        Self::try_parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse `argv`, accepting `-term` query words anywhere in the query.
    ///
    /// Once the query has started every word is taken as query text, so known
    /// options found after it (`rust -fork --json`) are moved ahead of the
    /// query and the line is parsed again.
    pub fn try_parse_args<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        let cli = Self::try_parse_from(&argv)?;
        let Command::Search(args) = &cli.command else {
            return Ok(cli);
        };

        let Some(start) = argv.len().checked_sub(args.query.len()) else {
            return Ok(cli);
        };
        let (head, tail) = argv.split_at(start);
        let is_suffix = tail.iter().zip(&args.query).all(|(raw, word)| raw == word.as_str());
        if !is_suffix || head.iter().any(|raw| raw == "--") {
            return Ok(cli);
        }

        let (options, words) = lift_options(&args.query, &search_options());
        if options.is_empty() {
            return Ok(cli);
        }
        tracing::trace!(target: "trawl", ?options, "cli.options.lifted");
        let reordered = head
            .iter()
            .cloned()
            .chain(options.into_iter().map(OsString::from))
            .chain(words.into_iter().map(OsString::from));
        Self::try_parse_from(reordered)
    }
}

/// A named option accepted by `trawl search`, including inherited globals.
#[derive(Debug, Clone)]
struct KnownOption {
    short: Option<char>,
    long: Option<String>,
    takes_value: bool,
}

impl KnownOption {
    fn matches(&self, word: &str) -> bool {
        let short = self.short.is_some_and(|c| {
            word.strip_prefix('-').is_some_and(|rest| rest.len() == c.len_utf8() && rest.starts_with(c))
        });
        let long = self.long.as_deref().is_some_and(|name| {
            word.strip_prefix("--").is_some_and(|rest| {
                rest == name
                    || (self.takes_value
                        && rest.strip_prefix(name).is_some_and(|v| v.starts_with('=')))
            })
        });
        short || long
    }

    fn value_follows(&self, word: &str) -> bool {
        self.takes_value && !word.contains('=')
    }
}

fn search_options() -> Vec<KnownOption> {
    let mut cmd = Cli::command();
    cmd.build();
    cmd.find_subcommand("search")
        .map(|search| {
            search
                .get_arguments()
                .filter(|arg| !arg.is_positional())
                .map(|arg| KnownOption {
                    short: arg.get_short(),
                    long: arg.get_long().map(str::to_string),
                    takes_value: arg.get_action().takes_values(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Split query words into known options (with their values) and query text.
fn lift_options(words: &[String], known: &[KnownOption]) -> (Vec<String>, Vec<String>) {
    let mut options = Vec::new();
    let mut query = Vec::new();
    let mut iter = words.iter();
    while let Some(word) = iter.next() {
        match known.iter().find(|opt| opt.matches(word)) {
            Some(opt) => {
                options.push(word.clone());
                if opt.value_follows(word) {
                    options.extend(iter.next().cloned());
                }
            }
            None => query.push(word.clone()),
        }
    }
    (options, query)
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search and print result URLs, one per line
    Search(SearchArgs),
    /// Print a page rendered as markdown
    Read(ReadArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Query text; operators such as site:, -term or "exact phrase" pass through unchanged
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub query: Vec<String>,

    /// Number of results to ask the engine for
    #[arg(short, long)]
    pub num: Option<NonZeroU32>,

    /// Print title, URL and snippet per result
    #[arg(long, conflicts_with = "json")]
    pub detailed: bool,

    /// Print results as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// Words joined by single spaces; a blank query is a usage error.
    pub fn search_query(&self) -> Result<SearchQuery, clap::Error> {
        SearchQuery::new(self.query.join(" ")).map_err(|_| {
            Cli::command().error(ErrorKind::InvalidValue, "the search query must not be blank")
        })
    }

    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.detailed {
            OutputFormat::Detailed
        } else {
            OutputFormat::Urls
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ReadArgs {
    /// Page to fetch (http or https)
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Urls,
    Detailed,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn missing_query_is_a_usage_error() {
        let err = Cli::try_parse_args(["trawl", "search"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn zero_num_is_rejected() {
        let err = Cli::try_parse_args(["trawl", "search", "rust", "--num", "0"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn query_words_are_joined() {
        let cli = Cli::try_parse_args(["trawl", "search", "site:docs.rs", "serde json", "-n", "15"])
            .unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.search_query().unwrap().as_str(), "site:docs.rs serde json");
        assert_eq!(args.num, NonZeroU32::new(15));
        assert_eq!(args.format(), OutputFormat::Urls);
    }

    #[test]
    fn blank_query_is_a_usage_error() {
        let cli = Cli::try_parse_args(["trawl", "search", "  "]).unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        let err = args.search_query().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn detailed_and_json_conflict() {
        let err = Cli::try_parse_args(["trawl", "search", "x", "--detailed", "--json"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    fn search_args(argv: &[&str]) -> SearchArgs {
        let cli = Cli::try_parse_args(argv.iter().copied()).unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        args
    }

    #[test]
    fn quoted_query_may_start_with_exclusion() {
        let args = search_args(&["trawl", "search", "-site:pinterest.com rust logo"]);
        assert_eq!(
            args.search_query().unwrap().as_str(),
            "-site:pinterest.com rust logo"
        );

        let args = search_args(&["trawl", "search", "-site:x.com rust"]);
        assert_eq!(args.search_query().unwrap().as_str(), "-site:x.com rust");
    }

    #[test]
    fn exclusion_words_pass_through_unchanged() {
        let args = search_args(&["trawl", "search", "rust", "-fork", "--no-such-flag"]);
        assert_eq!(
            args.search_query().unwrap().as_str(),
            "rust -fork --no-such-flag"
        );
        assert_eq!(args.format(), OutputFormat::Urls);
    }

    #[test]
    fn options_after_exclusion_words_still_apply() {
        let args = search_args(&["trawl", "search", "rust", "-fork", "-n", "5", "--json"]);
        assert_eq!(args.search_query().unwrap().as_str(), "rust -fork");
        assert_eq!(args.num, NonZeroU32::new(5));
        assert_eq!(args.format(), OutputFormat::Json);

        let args = search_args(&["trawl", "search", "--detailed", "-site:x.com", "--num=3", "tokio"]);
        assert_eq!(args.search_query().unwrap().as_str(), "-site:x.com tokio");
        assert_eq!(args.num, NonZeroU32::new(3));
        assert_eq!(args.format(), OutputFormat::Detailed);
    }

    #[test]
    fn global_flags_after_query_are_lifted() {
        let cli = Cli::try_parse_args(["trawl", "search", "rust", "-fork", "-v", "--config", "/tmp/t.yaml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/t.yaml")));
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.search_query().unwrap().as_str(), "rust -fork");
    }

    #[test]
    fn escaped_words_are_never_lifted() {
        let args = search_args(&["trawl", "search", "--", "-n", "rust"]);
        assert_eq!(args.search_query().unwrap().as_str(), "-n rust");
    }

    #[test]
    fn read_takes_a_url_and_global_flags() {
        let cli = Cli::try_parse_args(["trawl", "read", "https://example.com", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Read(ReadArgs { ref url }) if url == "https://example.com"));
    }
}
