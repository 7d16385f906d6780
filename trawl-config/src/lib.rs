//! Loader for `trawl` configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. YAML files (`--config`, or the optional `$XDG_CONFIG_HOME/trawl/trawl.yaml`)
//! 2. inline YAML snippets (tests)
//! 3. `TRAWL__`-prefixed environment variables, `__` separating sections
//!    (`TRAWL__READER__TIMEOUT_SECS=10`)
//!
//! Every field has a default, so an empty configuration is valid. String
//! values may reference `${VAR}` placeholders which are expanded at load time.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use trawl_common::observability::LogFormat;
use trawl_common::{DEFAULT_ENGINE_URL, DEFAULT_READER_BASE, DEFAULT_TIMEOUT_SECS};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TRAWL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrawlConfig {
    pub reader: ReaderConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Where the reader proxy lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_READER_BASE.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub engine_url: String,
    /// Result count sent as `num` when the command line does not give one.
    pub default_num: Option<u32>,
    /// Appended to the built-in denylist; built-in entries cannot be removed.
    pub extra_denylist: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine_url: DEFAULT_ENGINE_URL.into(),
            default_num: None,
            extra_denylist: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: "warn".into(),
        }
    }
}

impl TrawlConfig {
    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.reader.base_url.trim().is_empty() {
            return Err(ConfigError::Message("reader.base_url must not be empty".into()));
        }
        if !self.reader.base_url.ends_with('/') {
            self.reader.base_url.push('/');
        }
        if self.reader.timeout_secs == 0 {
            return Err(ConfigError::Message("reader.timeout_secs must be positive".into()));
        }
        if self.search.default_num == Some(0) {
            return Err(ConfigError::Message("search.default_num must be positive".into()));
        }
        self.search
            .extra_denylist
            .retain(|entry| !entry.trim().is_empty());
        Ok(self)
    }
}

/// Location of the per-user config file, whether or not it exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trawl").join("trawl.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TrawlConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TrawlConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TrawlConfigLoader {
    /// Start from built-in defaults; environment overrides are applied at [`load`](Self::load).
    ///
    /// ```
    /// use trawl_config::TrawlConfigLoader;
    ///
    /// let config = TrawlConfigLoader::new().load().expect("defaults are valid");
    ///
    /// assert_eq!(config.reader.base_url, "https://r.jina.ai/");
    /// assert_eq!(config.search.engine_url, "https://www.google.com/search");
    /// assert!(config.search.extra_denylist.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach the per-user file from [`default_config_path`], if a config dir is known.
    pub fn with_default_file(self) -> Self {
        match default_config_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use trawl_config::TrawlConfigLoader;
    ///
    /// let cfg = TrawlConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// reader:
    ///   base_url: "http://localhost:8080"
    /// search:
    ///   default_num: 20
    ///   extra_denylist: ["pinterest.com"]
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.reader.base_url, "http://localhost:8080/");
    /// assert_eq!(cfg.search.default_num, Some(20));
    /// assert_eq!(cfg.search.extra_denylist, vec!["pinterest.com"]);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `TRAWL__` environment variables are layered on top of every file
    /// source, then `${VAR}` placeholders are expanded.
    ///
    /// ```
    /// use trawl_config::TrawlConfigLoader;
    ///
    /// unsafe { std::env::set_var("READER_HOST", "reader.internal"); }
    ///
    /// let config = TrawlConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// reader:
    ///   base_url: "https://${READER_HOST}/"
    ///   timeout_secs: 5
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.reader.base_url, "https://reader.internal/");
    /// assert_eq!(config.reader.timeout_secs, 5);
    ///
    /// unsafe { std::env::remove_var("READER_HOST"); }
    /// ```
    pub fn load(self) -> Result<TrawlConfig, ConfigError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("search.extra_denylist");
        let cfg = self.builder.add_source(env).build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: TrawlConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        typed.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_placeholders_inside_urls() {
        temp_env::with_var("PROXY", Some("r.example.net"), || {
            let mut v = json!("https://${PROXY}/");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("https://r.example.net/"));
        });
    }

    #[test]
    fn expands_in_lists_and_sections() {
        temp_env::with_vars([("BLOCKED", Some("pinterest.com")), ("SECS", Some("12"))], || {
            let mut v = json!({
                "search": { "extra_denylist": ["$BLOCKED", "quora.com"] },
                "reader": { "timeout_label": "${SECS}s", "timeout_secs": 12 },
                "flag": true,
                "none": null
            });
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!({
                    "search": { "extra_denylist": ["pinterest.com", "quora.com"] },
                    "reader": { "timeout_label": "12s", "timeout_secs": 12 },
                    "flag": true,
                    "none": null
                })
            );
        });
    }

    #[test]
    fn expansion_follows_chained_variables() {
        temp_env::with_vars(
            [
                ("HOST", Some("reader.internal")),
                ("ORIGIN", Some("https://${HOST}")),
                ("BASE", Some("${ORIGIN}/proxy/")),
            ],
            || {
                let mut v = json!("${BASE}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("https://reader.internal/proxy/"));
            },
        );
    }

    #[test]
    fn expansion_terminates_on_cycles() {
        temp_env::with_vars([("LEFT", Some("${RIGHT}")), ("RIGHT", Some("${LEFT}"))], || {
            let mut v = json!("a-${LEFT}-b");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("a-") && s.ends_with("-b"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("https://${TRAWL_SURELY_UNSET_VAR}/");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("https://${TRAWL_SURELY_UNSET_VAR}/"));
    }

    #[test]
    fn validate_appends_trailing_slash_and_drops_blank_entries() {
        let mut cfg = TrawlConfig::default();
        cfg.reader.base_url = "http://localhost:9000".into();
        cfg.search.extra_denylist = vec!["  ".into(), "quora.com".into()];
        let cfg = cfg.validate().unwrap();
        assert_eq!(cfg.reader.base_url, "http://localhost:9000/");
        assert_eq!(cfg.search.extra_denylist, vec!["quora.com"]);
    }

    #[test]
    fn validate_rejects_zero_values() {
        let mut cfg = TrawlConfig::default();
        cfg.reader.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrawlConfig::default();
        cfg.search.default_num = Some(0);
        assert!(cfg.validate().is_err());
    }
}
