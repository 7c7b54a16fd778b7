//! Normalized bookmark records.

use crate::slug::DEFAULT_CATEGORY;
use serde::{Deserialize, Serialize};

/// A bookmark as produced by one of the import formats.
///
/// Every format adapter maps its own field names onto this shape. The
/// `category` is a `/`-joined path whose segments are already slugs, and
/// `tags` is a comma-joined string exactly as the source provided it.
///
/// # Field Mapping
///
/// | Field | Required | Default |
/// |-------|----------|---------|
/// | `title` | No | `Untitled` (applied when written) |
/// | `uri` | Yes | - |
/// | `category` | No | `unsorted` |
/// | `tags` | No | empty |
/// | `add_date` | No | `None` |
/// | `last_modified` | No | `None` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    /// Display title.
    pub title: String,
    /// Target URI (URL or local path).
    pub uri: String,
    /// Slugified, `/`-separated category path.
    pub category: String,
    /// Comma-joined tags.
    #[serde(default)]
    pub tags: String,
    /// Creation time as given by the source (usually Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_date: Option<String>,
    /// Last modification time as given by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl BookmarkRecord {
    /// Creates a record in the default category with no tags.
    #[must_use]
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
            category: DEFAULT_CATEGORY.to_string(),
            tags: String::new(),
            add_date: None,
            last_modified: None,
        }
    }

    /// Sets the category path.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the comma-joined tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Sets the creation date.
    #[must_use]
    pub fn with_add_date(mut self, add_date: impl Into<String>) -> Self {
        self.add_date = Some(add_date.into());
        self
    }

    /// Returns whether the record can be turned into a file.
    #[must_use]
    pub fn has_uri(&self) -> bool {
        !self.uri.trim().is_empty()
    }

    /// Splits the comma-joined tags into trimmed, non-empty values.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        split_tags(&self.tags)
    }
}

/// Splits a comma-joined tag string.
pub(crate) fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
