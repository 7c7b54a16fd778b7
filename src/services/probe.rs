//! Remote URI probing for manually added bookmarks.

use crate::io::formats::html::decode_entities;
use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static TITLE_PATTERN: LazyLock<Regex> = lazy_regex!(r"(?is)<title[^>]*>(.*?)</title\s*>");

/// What a probe learned about a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// URL after following redirects.
    pub final_url: String,
    /// HTTP status of the final response.
    pub status: u16,
    /// Page `<title>`, if the response was HTML and had one.
    pub title: Option<String>,
}

impl PageInfo {
    /// Returns whether the status counts as reachable (200 to 399).
    #[must_use]
    pub const fn is_accessible(&self) -> bool {
        self.status >= 200 && self.status < 400
    }
}

/// Looks up remote URLs.
///
/// Implemented over HTTP by [`HttpProbe`]; tests substitute canned answers.
pub trait UriProbe: Send + Sync {
    /// Requests `url`, following redirects.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or times out.
    fn probe(&self, url: &str) -> Result<PageInfo>;
}

/// [`UriProbe`] backed by a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::blocking::Client,
}

impl HttpProbe {
    /// Builds a probe with a whole-request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::OperationFailed {
                operation: "build_http_client".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl UriProbe for HttpProbe {
    fn probe(&self, url: &str) -> Result<PageInfo> {
        let response = self.client.get(url).send().map_err(|e| Error::OperationFailed {
            operation: "probe_uri".to_string(),
            cause: e.to_string(),
        })?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));

        // A body that fails to download still leaves a usable status
        let title = if is_html {
            response.text().ok().as_deref().and_then(extract_title)
        } else {
            None
        };

        tracing::debug!(url, %final_url, status, "Probed URI");
        Ok(PageInfo {
            final_url,
            status,
            title,
        })
    }
}

/// Pulls the `<title>` out of an HTML document.
pub(crate) fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_PATTERN.captures(html)?.get(1)?.as_str();
    let title = decode_entities(&raw.split_whitespace().collect::<Vec<_>>().join(" "));
    Some(title).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<html><head><TITLE>\n  Rust &amp; Cargo\n</TITLE></head></html>"),
            Some("Rust & Cargo".to_string())
        );
        assert_eq!(
            extract_title("<title lang=\"en\">Attrs</title>"),
            Some("Attrs".to_string())
        );
        assert_eq!(extract_title("<title>   </title>"), None);
        assert_eq!(extract_title("<h1>No title</h1>"), None);
    }

    #[test]
    fn test_accessible_statuses() {
        let page = |status| PageInfo {
            final_url: "https://x.example".to_string(),
            status,
            title: None,
        };
        assert!(page(200).is_accessible());
        assert!(page(301).is_accessible());
        assert!(!page(404).is_accessible());
        assert!(!page(500).is_accessible());
        assert!(!page(199).is_accessible());
    }

    #[test]
    fn test_http_probe_builds() {
        assert!(HttpProbe::new(Duration::from_secs(30), "Bash-Bookmarks/1.0").is_ok());
    }
}
