//! Configuration for Quill.
//!
//! Parses `quill.toml` with serde and discovers it in the current directory
//! or any parent. Command-line flags are layered on top via [`CliSettings`].
//!
//! ```toml
//! [docs]
//! source_dir = "content"
//! url_prefix = "/handbook"
//!
//! [cache]
//! ttl_secs = 3600
//! max_entries = 500
//!
//! [site]
//! name = "${SITE_NAME:-Handbook}"
//! locale = "en_GB"
//! twitter_creator = "@quill"
//!
//! [toc]
//! debounce_ms = 150
//! scroll_margin = 80
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` expands to the value of VAR, errors if unset
//! - `${VAR:-default}` expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `docs.url_prefix`, `site.name`, `site.locale`,
//! `site.twitter_creator`.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Values from the command line that override the loaded file.
///
/// Only `Some` fields apply.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_dir: Option<PathBuf>,
    pub url_prefix: Option<String>,
    /// Override the frontmatter cache lifetime.
    pub cache_ttl_secs: Option<u64>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Docs section as written (paths relative to the config file).
    docs: DocsConfigRaw,
    pub cache: CacheConfig,
    pub site: SiteConfig,
    pub toc: TocConfig,

    /// Docs section with paths resolved (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file, if one was loaded.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    url_prefix: Option<String>,
}

/// Resolved documentation settings.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DocsConfig {
    /// Directory holding the markdown sources.
    pub source_dir: PathBuf,
    /// Prefix joined in front of every document slug.
    pub url_prefix: String,
}

/// Frontmatter cache policy.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            max_entries: 1000,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Site-wide defaults for page metadata.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub locale: String,
    pub twitter_creator: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Quill".to_owned(),
            locale: "en_US".to_owned(),
            twitter_creator: None,
        }
    }
}

/// Table-of-contents behaviour.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TocConfig {
    /// Quiet period after the last scroll event, in milliseconds.
    pub debounce_ms: u64,
    /// Pixel slack used for heading visibility and panel scrolling.
    pub scroll_margin: f64,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            scroll_margin: 100.0,
        }
    }
}

impl TocConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// A `${VAR}` reference with no value and no default.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path, e.g. `site.name`.
        field: String,
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration, then apply CLI settings.
    ///
    /// With `config_path`, loads that file. Otherwise searches for
    /// `quill.toml` in the current directory and its parents, falling back
    /// to defaults rooted at the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` does not exist, or if
    /// reading, parsing, expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Resolved slug prefix, without a trailing slash.
    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.docs_resolved.url_prefix
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(url_prefix) = &settings.url_prefix {
            self.docs_resolved.url_prefix.clone_from(url_prefix);
        }
        if let Some(ttl_secs) = settings.cache_ttl_secs {
            self.cache.ttl_secs = ttl_secs;
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let start = std::env::current_dir().ok()?;
        Self::discover_from(&start)
    }

    /// Walk up from `start` looking for `quill.toml`.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            docs: DocsConfigRaw::default(),
            cache: CacheConfig::default(),
            site: SiteConfig::default(),
            toc: TocConfig::default(),
            docs_resolved: DocsConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges after loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.docs_resolved.url_prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "docs.url_prefix must be empty or start with /".to_owned(),
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache.ttl_secs must be greater than 0".to_owned(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Validation(
                "cache.max_entries must be greater than 0".to_owned(),
            ));
        }

        require_non_empty(&self.site.name, "site.name")?;
        require_non_empty(&self.site.locale, "site.locale")?;

        if !self.toc.scroll_margin.is_finite() || self.toc.scroll_margin < 0.0 {
            return Err(ConfigError::Validation(
                "toc.scroll_margin must be a non-negative number".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.docs.url_prefix {
            self.docs.url_prefix = Some(expand::expand_env(prefix, "docs.url_prefix")?);
        }

        self.site.name = expand::expand_env(&self.site.name, "site.name")?;
        self.site.locale = expand::expand_env(&self.site.locale, "site.locale")?;
        if let Some(creator) = &self.site.twitter_creator {
            self.site.twitter_creator = Some(expand::expand_env(creator, "site.twitter_creator")?);
        }

        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        // A trailing slash would double up when joined with the document path.
        let url_prefix = self
            .docs
            .url_prefix
            .as_deref()
            .unwrap_or("/docs")
            .trim_end_matches('/')
            .to_owned();

        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
            url_prefix,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml: &str) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));
        config
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.docs_resolved,
            DocsConfig {
                source_dir: PathBuf::from("/test/docs"),
                url_prefix: "/docs".to_owned(),
            }
        );
        assert_eq!(config.cache.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.site.name, "Quill");
        assert_eq!(config.toc.debounce(), Duration::from_millis(200));
        assert_eq!(config.toc.scroll_margin, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_file_uses_defaults() {
        let config = parse("");
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.site, SiteConfig::default());
        assert_eq!(config.toc, TocConfig::default());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_parse_all_sections() {
        let config = parse(
            r#"
[docs]
source_dir = "content"
url_prefix = "/handbook/"

[cache]
ttl_secs = 60
max_entries = 10

[site]
name = "Handbook"
locale = "en_GB"
twitter_creator = "@quill"

[toc]
debounce_ms = 50
scroll_margin = 40
"#,
        );

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/project/content"));
        assert_eq!(config.url_prefix(), "/handbook");
        assert_eq!(
            config.cache,
            CacheConfig {
                ttl_secs: 60,
                max_entries: 10
            }
        );
        assert_eq!(config.site.twitter_creator.as_deref(), Some("@quill"));
        assert_eq!(config.toc.debounce_ms, 50);
        assert_eq!(config.toc.scroll_margin, 40.0);
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        let result: Result<Config, _> = toml::from_str("[cache]\nttl_secs = \"soon\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_site_name_default() {
        let config = parse("[site]\nname = \"${QUILL_CONFIG_TEST_NO_SUCH_VAR:-Handbook}\"\n");
        assert_eq!(config.site.name, "Handbook");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        let mut config: Config =
            toml::from_str("[site]\ntwitter_creator = \"${QUILL_CONFIG_TEST_NO_SUCH_VAR}\"\n")
                .unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("site.twitter_creator"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings {
            source_dir: Some(PathBuf::from("/elsewhere")),
            cache_ttl_secs: Some(5),
            ..Default::default()
        });

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/elsewhere"));
        assert_eq!(config.url_prefix(), "/docs"); // Unchanged
        assert_eq!(config.cache.ttl_secs, 5);
    }

    #[test]
    fn test_validate_url_prefix_needs_slash() {
        let config = parse("[docs]\nurl_prefix = \"docs\"\n");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("docs.url_prefix"));
    }

    #[test]
    fn test_validate_empty_url_prefix_allowed() {
        let config = parse("[docs]\nurl_prefix = \"\"\n");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let config = parse("[cache]\nttl_secs = 0\n");
        assert!(config.validate().unwrap_err().to_string().contains("cache.ttl_secs"));
    }

    #[test]
    fn test_validate_zero_max_entries() {
        let config = parse("[cache]\nmax_entries = 0\n");
        assert!(config.validate().unwrap_err().to_string().contains("cache.max_entries"));
    }

    #[test]
    fn test_validate_blank_site_name() {
        let config = parse("[site]\nname = \" \"\n");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_negative_scroll_margin() {
        let config = parse("[toc]\nscroll_margin = -1.0\n");
        assert!(config.validate().unwrap_err().to_string().contains("toc.scroll_margin"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");
        std::fs::write(&path, "[docs]\nsource_dir = \"pages\"\n\n[toc]\ndebounce_ms = 10\n")
            .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.docs_resolved.source_dir, dir.path().join("pages"));
        assert_eq!(config.toc.debounce_ms, 10);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");
        std::fs::write(&path, "[docs\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_applies_cli_settings_last() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");
        std::fs::write(&path, "[docs]\nurl_prefix = \"/guide\"\n").unwrap();

        let settings = CliSettings {
            url_prefix: Some("/manual".to_owned()),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.url_prefix(), "/manual");
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("quill.toml"), "").unwrap();

        assert_eq!(
            Config::discover_from(&nested),
            Some(dir.path().join("quill.toml"))
        );
    }

    #[test]
    fn test_discover_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("quill.toml"), "").unwrap();
        std::fs::write(nested.join("quill.toml"), "").unwrap();

        assert_eq!(Config::discover_from(&nested), Some(nested.join("quill.toml")));
    }
}
