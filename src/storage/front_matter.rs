//! Bookmark file format.
//!
//! A bookmark file is a front matter block followed by a single Markdown
//! link:
//!
//! ```text
//! ---
//! title: Rust
//! uri: https://www.rust-lang.org
//! tags: [dev,rust]
//! add_date: 1700000000
//! ---
//! [Rust](https://www.rust-lang.org)
//! ```
//!
//! Rendering and extraction share the field definitions below, so the writer
//! and the search engine cannot drift apart.

use crate::models::split_tags;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

/// Line that opens and closes the front matter block.
pub const DELIMITER: &str = "---";

static TITLE_PATTERN: LazyLock<Regex> = lazy_regex!(r"(?m)^title:[ \t]*(.*?)[ \t]*\r?$");
static URI_PATTERN: LazyLock<Regex> = lazy_regex!(r"(?m)^uri:[ \t]*(.*?)[ \t]*\r?$");
static TAGS_PATTERN: LazyLock<Regex> = lazy_regex!(r"(?m)^tags:[ \t]*\[(.*)\][ \t]*\r?$");
static ADD_DATE_PATTERN: LazyLock<Regex> = lazy_regex!(r"(?m)^add_date:[ \t]*(.*?)[ \t]*\r?$");
static LAST_MODIFIED_PATTERN: LazyLock<Regex> =
    lazy_regex!(r"(?m)^last_modified:[ \t]*(.*?)[ \t]*\r?$");

/// Metadata stored at the top of every bookmark file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// Bookmark title.
    pub title: String,
    /// Bookmark URI.
    pub uri: String,
    /// Tags in stored order.
    pub tags: Vec<String>,
    /// Creation date, if the source provided one.
    pub add_date: Option<String>,
    /// Last modification date, if the source provided one.
    pub last_modified: Option<String>,
}

impl FrontMatter {
    /// Renders the complete file contents: front matter plus link body.
    ///
    /// Line breaks inside values are flattened to spaces so every field stays
    /// on its own line.
    #[must_use]
    pub fn render(&self) -> String {
        let title = single_line(&self.title);
        let uri = single_line(&self.uri);
        let tags = self
            .tags
            .iter()
            .map(|t| single_line(t))
            .collect::<Vec<_>>()
            .join(",");

        let mut out = String::new();
        let _ = writeln!(out, "{DELIMITER}");
        let _ = writeln!(out, "title: {title}");
        let _ = writeln!(out, "uri: {uri}");
        let _ = writeln!(out, "tags: [{tags}]");
        if let Some(add_date) = self.add_date.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "add_date: {}", single_line(add_date));
        }
        if let Some(modified) = self.last_modified.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "last_modified: {}", single_line(modified));
        }
        let _ = writeln!(out, "{DELIMITER}");
        let _ = writeln!(out, "[{title}]({uri})");
        out
    }

    /// Extracts metadata from file contents.
    ///
    /// Only the front matter block is searched when one is present, so text in
    /// the body can never shadow a field. Missing fields come back empty.
    #[must_use]
    pub fn extract(content: &str) -> Self {
        let block = front_matter_block(content).unwrap_or(content);

        let capture = |pattern: &Regex| {
            pattern
                .captures(block)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
        };

        let tags = capture(&TAGS_PATTERN)
            .map(|t| split_tags(&t))
            .unwrap_or_default();

        Self {
            title: capture(&TITLE_PATTERN).unwrap_or_default(),
            uri: capture(&URI_PATTERN).unwrap_or_default(),
            tags,
            add_date: capture(&ADD_DATE_PATTERN).filter(|d| !d.is_empty()),
            last_modified: capture(&LAST_MODIFIED_PATTERN).filter(|d| !d.is_empty()),
        }
    }
}

/// Returns the text between the opening and closing delimiter lines.
fn front_matter_block(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content
        .strip_prefix(DELIMITER)?
        .trim_start_matches([' ', '\t']);
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
