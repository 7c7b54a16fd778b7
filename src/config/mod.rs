//! Configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config`, or `markstash/config.toml` in the
//!    platform config directory)
//! 3. Environment variables (`BOOKMARKS_DIR`, `BOOKMARKS_LOG_LEVEL`,
//!    `BOOKMARKS_LOG_FILE`, `BOOKMARKS_LOG_FORMAT`)
//! 4. Command-line flags, applied by the binary
//!
//! ```toml
//! bookmarks_dir = "~/bookmarks"
//! search_limit = 50
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! file = "/var/log/markstash.log"
//!
//! [http]
//! timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default bookmark root.
pub const DEFAULT_BOOKMARKS_DIR: &str = "/data/bookmarks";

/// Default largest accepted import file (50 MiB).
pub const DEFAULT_MAX_IMPORT_SIZE: u64 = 50 * 1024 * 1024;

/// Default timeout for URL checks when adding bookmarks.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default user agent for URL checks.
pub const DEFAULT_USER_AGENT: &str = "Bash-Bookmarks/1.0 (X11; Linux x86_64; rv:10.0)";

/// Main configuration for markstash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkstashConfig {
    /// Root directory of the bookmark tree.
    pub bookmarks_dir: PathBuf,
    /// Maximum number of search results.
    pub search_limit: usize,
    /// Largest accepted import file, in bytes.
    pub max_import_size: u64,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Settings for URL checks.
    pub http: HttpSettings,
}

/// Logging settings as configured; resolved by the observability module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoggingSettings {
    /// Level or filter directive, such as `debug` or `markstash=trace`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// `pretty` or `json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Settings for URL checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpSettings {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Bookmark root.
    pub bookmarks_dir: Option<String>,
    /// Max search results.
    pub search_limit: Option<usize>,
    /// Max import size in bytes.
    pub max_import_size: Option<u64>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// HTTP section.
    pub http: Option<ConfigFileHttp>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Level or filter directive.
    pub level: Option<String>,
    /// Output format.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

/// HTTP section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileHttp {
    /// Timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// User agent.
    pub user_agent: Option<String>,
}

impl Default for MarkstashConfig {
    fn default() -> Self {
        Self {
            bookmarks_dir: PathBuf::from(DEFAULT_BOOKMARKS_DIR),
            search_limit: crate::services::DEFAULT_SEARCH_LIMIT,
            max_import_size: DEFAULT_MAX_IMPORT_SIZE,
            logging: LoggingSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

impl MarkstashConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the configuration for a process: file, then environment.
    ///
    /// An explicit `path` must exist and parse; the default location is
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit or default config file cannot be read
    /// or parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default()?,
        };
        Ok(config.with_env_overrides())
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/.config/markstash/` on Linux,
    ///    `~/Library/Application Support/markstash/` on macOS)
    /// 2. XDG-style `~/.config/markstash/`
    ///
    /// Returns default configuration if no config file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    /// Logging is not set up yet when this runs, so the caller reports it.
    pub fn load_default() -> crate::Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        let candidates = [
            base_dirs.config_dir().join("markstash").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("markstash")
                .join("config.toml"),
        ];

        Self::load_first(&candidates)
    }

    /// Loads the first existing file among `candidates`, or the defaults.
    fn load_first(candidates: &[PathBuf]) -> crate::Result<Self> {
        candidates
            .iter()
            .find(|p| p.exists())
            .map_or_else(|| Ok(Self::default()), |path| Self::load_from_file(path))
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    #[must_use]
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("BOOKMARKS_DIR") {
            self.bookmarks_dir = expand_home(&dir);
        }
        if let Some(level) = get("BOOKMARKS_LOG_LEVEL") {
            self.logging.level = Some(level);
        }
        if let Some(file) = get("BOOKMARKS_LOG_FILE") {
            self.logging.file = Some(expand_home(&file));
        }
        if let Some(format) = get("BOOKMARKS_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        self
    }

    /// Converts a `ConfigFile` to `MarkstashConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(dir) = file.bookmarks_dir {
            config.bookmarks_dir = expand_home(&dir);
        }
        if let Some(limit) = file.search_limit {
            config.search_limit = limit;
        }
        if let Some(size) = file.max_import_size {
            config.max_import_size = size;
        }
        if let Some(logging) = file.logging {
            config.logging.level = logging.level;
            config.logging.format = logging.format;
            config.logging.file = logging.file.as_deref().map(expand_home);
        }
        if let Some(http) = file.http {
            if let Some(timeout) = http.timeout_secs {
                config.http.timeout_secs = timeout;
            }
            if let Some(user_agent) = http.user_agent {
                config.http.user_agent = user_agent;
            }
        }

        config
    }

    /// Sets the bookmark root.
    #[must_use]
    pub fn with_bookmarks_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.bookmarks_dir = path.into();
        self
    }

    /// Returns the URL check timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

/// Expands a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(base_dirs) = directories::BaseDirs::new() {
            return base_dirs.home_dir().join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MarkstashConfig::default();
        assert_eq!(config.bookmarks_dir, PathBuf::from("/data/bookmarks"));
        assert_eq!(config.search_limit, 20);
        assert_eq!(config.max_import_size, 50 * 1024 * 1024);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config = MarkstashConfig::from_toml(
            r#"
            bookmarks_dir = "/srv/bookmarks"
            search_limit = 5

            [logging]
            level = "debug"
            format = "json"

            [http]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.bookmarks_dir, PathBuf::from("/srv/bookmarks"));
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.max_import_size, DEFAULT_MAX_IMPORT_SIZE);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert_eq!(config.http.timeout_secs, 3);
        assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(MarkstashConfig::from_toml("bookmark_dir = \"/typo\"").is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BOOKMARKS_DIR", "/env/bookmarks"),
            ("BOOKMARKS_LOG_LEVEL", "warn"),
            ("BOOKMARKS_LOG_FORMAT", ""),
        ]);
        let config = MarkstashConfig::from_toml("[logging]\nformat = \"json\"\nlevel = \"debug\"\n")
            .unwrap()
            .with_env_lookup(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.bookmarks_dir, PathBuf::from("/env/bookmarks"));
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
        // Empty values do not override
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = MarkstashConfig::load_from_file(Path::new("/nonexistent/markstash.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("read_config_file"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_import_size = 1024\n").unwrap();

        let config = MarkstashConfig::load_from_file(&path).unwrap();
        assert_eq!(config.max_import_size, 1024);
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("config.toml");
        std::fs::write(&present, "search_limit = 7\n").unwrap();

        let config = MarkstashConfig::load_first(&[missing.clone(), present]).unwrap();
        assert_eq!(config.search_limit, 7);

        let config = MarkstashConfig::load_first(&[missing]).unwrap();
        assert_eq!(config.search_limit, 20);
    }

    #[test]
    fn test_broken_default_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let broken = dir.path().join("config.toml");
        std::fs::write(&broken, "search_limit = \"many\"\n").unwrap();

        let err = MarkstashConfig::load_first(&[broken]).unwrap_err();
        assert!(err.to_string().contains("parse_config_file"));
    }

    #[test]
    fn test_serializes_to_toml() {
        let text = toml::to_string_pretty(&MarkstashConfig::default()).unwrap();
        assert!(text.contains("bookmarks_dir"));
        assert!(text.contains("/data/bookmarks"));
        assert!(text.contains("[http]"));
    }
}
