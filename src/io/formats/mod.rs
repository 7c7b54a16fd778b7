//! Format adapters for import.
//!
//! Each format implements [`ImportSource`]. The JSON-shaped formats share the
//! field alias tables and value helpers defined here.

pub mod csv;
pub mod html;
pub mod json;
pub mod pocket;

use crate::models::BookmarkRecord;
use crate::slug::slugify_path;
use crate::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use super::traits::ImportSource;

/// Number of leading bytes inspected by [`detect_format`].
pub const SAMPLE_SIZE: usize = 1024;

static HTML_FOLDER_MARKER: LazyLock<Regex> = lazy_regex!(r"(?i)<dt>\s*<h3");
static HTML_ANCHOR_MARKER: LazyLock<Regex> = lazy_regex!(r"(?i)<dt>\s*<a\b[^>]*href\s*=");
static NETSCAPE_DOCTYPE: LazyLock<Regex> = lazy_regex!(r"(?i)<!doctype\s+netscape-bookmark-file");

/// Supported import formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Netscape bookmark file, as exported by every major browser.
    Html,
    /// JSON array, `{bookmarks: [...]}`, `{items: [...]}` or a single object.
    Json,
    /// CSV with a header row.
    Csv,
    /// Pocket JSON export.
    Pocket,
}

impl Format {
    /// Returns all formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Html, Self::Json, Self::Csv, Self::Pocket]
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Pocket => "pocket",
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" | "htm" | "netscape" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "pocket" => Ok(Self::Pocket),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sniffs the format of import content.
///
/// Only the first [`SAMPLE_SIZE`] bytes are inspected. Checks run in order and
/// the first match wins:
///
/// 1. A Netscape folder or anchor marker means HTML. This runs first because
///    HTML exports often carry stray `{` or `[` characters.
/// 2. A sample starting with `{` or `[` that parses as JSON is Pocket when it
///    mentions `"list"` or `"given_url"`, plain JSON otherwise. A sample cut
///    short by the size limit counts as parsed when the only problem is the
///    unexpected end of input.
/// 3. A sample with a comma and a newline whose first line has a comma is CSV.
///
/// Returns `None` when nothing matches.
#[must_use]
pub fn detect_format(content: &[u8]) -> Option<Format> {
    let truncated = content.len() > SAMPLE_SIZE;
    let sample = &content[..content.len().min(SAMPLE_SIZE)];
    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        // Cut mid-character by the sample limit or not UTF-8 at all
        Err(e) => std::str::from_utf8(&sample[..e.valid_up_to()]).unwrap_or_default(),
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if HTML_FOLDER_MARKER.is_match(text)
        || HTML_ANCHOR_MARKER.is_match(text)
        || NETSCAPE_DOCTYPE.is_match(text)
    {
        return Some(Format::Html);
    }

    let trimmed = text.trim();
    if trimmed.starts_with(['{', '[']) {
        let parsed = match serde_json::from_str::<Value>(trimmed) {
            Ok(_) => true,
            Err(e) => truncated && e.is_eof(),
        };
        if parsed {
            if trimmed.contains("\"list\"") || trimmed.contains("\"given_url\"") {
                return Some(Format::Pocket);
            }
            return Some(Format::Json);
        }
    }

    let first_line = text.lines().next().unwrap_or_default();
    if text.contains(',') && text.contains('\n') && first_line.contains(',') {
        return Some(Format::Csv);
    }

    None
}

/// Sniffs the format of a file from its first bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn detect_file_format(path: &Path) -> Result<Option<Format>> {
    let file = File::open(path).map_err(|e| Error::OperationFailed {
        operation: "open_import_file".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;

    // One byte past the sample tells detection whether the sample was cut.
    let mut sample = Vec::with_capacity(SAMPLE_SIZE + 1);
    file.take(SAMPLE_SIZE as u64 + 1)
        .read_to_end(&mut sample)
        .map_err(|e| Error::OperationFailed {
            operation: "read_import_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

    Ok(detect_format(&sample))
}

/// Creates an import source for the given format over decoded content.
///
/// # Errors
///
/// Returns an error if the content is unusable as a whole: malformed
/// top-level JSON, a Pocket export that is not a mapping, or a CSV header
/// without any URI column.
pub fn create_import_source(content: String, format: Format) -> Result<Box<dyn ImportSource>> {
    match format {
        Format::Html => Ok(Box::new(html::HtmlImportSource::new(&content))),
        Format::Json => Ok(Box::new(json::JsonImportSource::new(&content)?)),
        Format::Csv => Ok(Box::new(csv::CsvImportSource::new(content)?)),
        Format::Pocket => Ok(Box::new(pocket::PocketImportSource::new(&content)?)),
    }
}

/// Field names tried, in order, for each record field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldAliases {
    pub title: &'static [&'static str],
    pub uri: &'static [&'static str],
    pub category: &'static [&'static str],
    pub default_category: &'static str,
    pub add_date: &'static [&'static str],
    pub last_modified: &'static [&'static str],
}

/// Aliases shared by JSON and CSV.
pub(crate) const GENERIC_FIELDS: FieldAliases = FieldAliases {
    title: &["title", "name"],
    uri: &["uri", "url", "link"],
    category: &["category", "folder"],
    default_category: crate::slug::DEFAULT_CATEGORY,
    add_date: &["add_date"],
    last_modified: &["last_modified"],
};

/// Aliases for Pocket items.
pub(crate) const POCKET_FIELDS: FieldAliases = FieldAliases {
    title: &["title", "name", "resolved_title", "given_title"],
    uri: &["uri", "url", "link", "resolved_url", "given_url"],
    category: &["category", "folder"],
    default_category: "pocket",
    add_date: &["add_date", "time_added"],
    last_modified: &["last_modified", "time_updated"],
};

/// Renders a scalar JSON value as text; empty strings count as missing.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Returns the first non-empty value among `keys`.
fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(value_text)
}

/// Joins a tags value into a comma-joined string.
///
/// Strings pass through, arrays are joined, and mappings contribute their
/// keys (Pocket stores `{"tag": {...}}`).
pub(crate) fn tags_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(map)) => map.keys().cloned().collect::<Vec<_>>().join(","),
        _ => String::new(),
    }
}

/// Maps a JSON object onto a record using `aliases`.
pub(crate) fn record_from_object(
    object: &Map<String, Value>,
    aliases: &FieldAliases,
) -> BookmarkRecord {
    let category = first_text(object, aliases.category)
        .map_or_else(|| aliases.default_category.to_string(), |c| slugify_path(&c));

    BookmarkRecord {
        title: first_text(object, aliases.title).unwrap_or_default(),
        uri: first_text(object, aliases.uri).unwrap_or_default(),
        category,
        tags: tags_text(object.get("tags")),
        add_date: first_text(object, aliases.add_date),
        last_modified: first_text(object, aliases.last_modified),
    }
}
