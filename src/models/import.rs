//! Import outcome types.

use super::BookmarkRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A bookmark file that was created on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenBookmark {
    /// Always `true`; kept so serialized output matches failure entries.
    pub success: bool,
    /// Full path of the created file.
    pub path: PathBuf,
    /// Title stored in the front matter.
    pub title: String,
    /// URI stored in the front matter.
    pub uri: String,
    /// Slugified category path the file was placed under.
    pub category: String,
    /// Tags stored in the front matter, category first.
    pub tags: Vec<String>,
}

/// One successfully handled record.
///
/// Dry runs report the normalized record; real imports report the file that
/// was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportedEntry {
    /// A file was created.
    Written(WrittenBookmark),
    /// The record would have been written (dry run).
    Record(BookmarkRecord),
}

/// A failure collected during import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportErrorEntry {
    /// What went wrong.
    pub error: String,
    /// Which record or file the failure belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ImportErrorEntry {
    /// Creates an entry without context.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            context: None,
        }
    }

    /// Attaches context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Result of an import operation.
///
/// `success + failed == total` holds for every completed import. Imports
/// that never reach parsing (missing file, unknown format, unreadable
/// content) report `total = 0, failed = 1` with a single error entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Records seen.
    pub total: usize,
    /// Records imported (or accepted, in a dry run).
    pub success: usize,
    /// Records that failed.
    pub failed: usize,
    /// Failures in encounter order.
    pub errors: Vec<ImportErrorEntry>,
    /// Successes in encounter order.
    pub imported: Vec<ImportedEntry>,
}

impl ImportResult {
    /// Creates an empty result.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: 0,
            success: 0,
            failed: 0,
            errors: Vec::new(),
            imported: Vec::new(),
        }
    }

    /// Creates the result for an import that aborted before parsing.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            total: 0,
            success: 0,
            failed: 1,
            errors: vec![ImportErrorEntry::new(error)],
            imported: Vec::new(),
        }
    }

    /// Counts one record as imported.
    pub fn push_success(&mut self, entry: ImportedEntry) {
        self.total += 1;
        self.success += 1;
        self.imported.push(entry);
    }

    /// Counts one record as failed.
    pub fn push_failure(&mut self, entry: ImportErrorEntry) {
        self.total += 1;
        self.failed += 1;
        self.errors.push(entry);
    }

    /// Returns whether any records were imported.
    #[must_use]
    pub const fn has_imports(&self) -> bool {
        self.success > 0
    }

    /// Returns whether any errors occurred.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_stay_balanced() {
        let mut result = ImportResult::new();
        result.push_success(ImportedEntry::Record(BookmarkRecord::new("a", "u")));
        result.push_failure(ImportErrorEntry::new("missing uri").with_context("record 2"));

        assert_eq!(result.total, 2);
        assert_eq!(result.success + result.failed, result.total);
        assert!(result.has_imports());
        assert!(result.has_errors());
    }

    #[test]
    fn test_failure_shape() {
        let result = ImportResult::failure("File not found: /nope");
        assert_eq!(result.total, 0);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors[0].error, "File not found: /nope");
        assert!(result.imported.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let mut result = ImportResult::new();
        result.push_success(ImportedEntry::Record(BookmarkRecord::new("a", "u")));
        result.push_failure(ImportErrorEntry::new("boom"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["imported"][0]["title"], "a");
        assert_eq!(json["errors"][0]["error"], "boom");
        assert!(json["errors"][0].get("context").is_none());
    }
}
