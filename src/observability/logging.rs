//! Log level and format resolution.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Filter used when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(crate::Error::InvalidInput(format!("Unknown log format: {s}"))),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Resolves settings against `--verbose` and `RUST_LOG`.
    ///
    /// Precedence for the filter is `--verbose`, then `RUST_LOG`, then the
    /// configured level. An invalid filter falls back to `info` and an unknown
    /// format to pretty output.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let rust_log = std::env::var("RUST_LOG").ok();
        let directive = resolve_directive(verbose, rust_log.as_deref(), settings.level.as_deref());
        let filter =
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

        let format = settings
            .format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();

        Self {
            filter,
            format,
            file: settings.file.clone(),
        }
    }
}

/// Picks the filter directive from the available sources.
pub(crate) fn resolve_directive(
    verbose: bool,
    rust_log: Option<&str>,
    configured: Option<&str>,
) -> String {
    if verbose {
        return "debug".to_string();
    }
    [rust_log, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(true, Some("warn"), Some("error") => "debug"; "verbose wins")]
    #[test_case(false, Some("warn"), Some("error") => "warn"; "rust_log beats config")]
    #[test_case(false, Some(" "), Some("error") => "error"; "blank rust_log ignored")]
    #[test_case(false, None, Some("markstash=trace") => "markstash=trace"; "config directive")]
    #[test_case(false, None, None => "info"; "default")]
    fn test_resolve_directive(verbose: bool, rust_log: Option<&str>, configured: Option<&str>) -> String {
        resolve_directive(verbose, rust_log, configured)
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let settings = LoggingSettings {
            level: Some("warn".to_string()),
            format: Some("xml".to_string()),
            file: None,
        };
        let config = LoggingConfig::from_settings(&settings, false);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }
}
