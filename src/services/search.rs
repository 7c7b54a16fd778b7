//! Brute-force bookmark search.
//!
//! There is no index: every query walks the bookmark tree and tests each file's
//! full text for the query, case-insensitively. Metadata of matching files is
//! read back with [`FrontMatter::extract`], the same definition the writer
//! renders with.
//!
//! The walk visits directories depth-first with entries sorted by file name,
//! so results come back in path order and are stable between runs. Scanning
//! stops as soon as `limit` matches have been collected.

use crate::models::SearchResult;
use crate::storage::{BOOKMARK_EXTENSION, FrontMatter};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Queries shorter than this many characters return no results.
pub const MIN_QUERY_CHARS: usize = 3;

/// Default maximum number of results.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Number of hex characters kept from the path hash in result ids.
const ID_LENGTH: usize = 32;

/// Searches bookmark files under a root directory.
#[derive(Debug, Clone)]
pub struct SearchService {
    root: PathBuf,
}

impl SearchService {
    /// Creates a search service rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns bookmarks whose file contains `query`, at most `limit` of them.
    ///
    /// Queries under [`MIN_QUERY_CHARS`] characters return nothing without
    /// touching the filesystem. Files that cannot be read are logged and
    /// skipped; a missing root yields no results.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        if query.chars().count() < MIN_QUERY_CHARS || limit == 0 {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let mut results = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable path during search");
                    continue;
                },
            };
            if !is_bookmark_file(&entry) {
                continue;
            }

            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unreadable bookmark file");
                    continue;
                },
            };
            if !content.to_lowercase().contains(&needle) {
                continue;
            }

            results.push(self.to_result(entry.path(), &content));
            if results.len() >= limit {
                break;
            }
        }

        debug!(query, results = results.len(), "Search finished");
        results
    }

    /// Returns the search results as a JSON array string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn suggest(&self, query: &str, limit: usize) -> Result<String> {
        serde_json::to_string(&self.search(query, limit)).map_err(|e| Error::OperationFailed {
            operation: "serialize_suggestions".to_string(),
            cause: e.to_string(),
        })
    }

    fn to_result(&self, path: &Path, content: &str) -> SearchResult {
        let front_matter = FrontMatter::extract(content);
        let category = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        SearchResult {
            id: self.result_id(path),
            url: front_matter.uri,
            title: front_matter.title,
            tags: front_matter.tags,
            category,
        }
    }

    /// Hashes the path relative to the root, so ids survive moving the root.
    fn result_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let mut id = hex::encode(Sha256::digest(key.as_bytes()));
        id.truncate(ID_LENGTH);
        id
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_bookmark_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .is_some_and(|ext| ext == BOOKMARK_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookmarkRecord;
    use crate::storage::BookmarkWriter;
    use tempfile::TempDir;

    fn seeded() -> (TempDir, SearchService) {
        let dir = TempDir::new().unwrap();
        let writer = BookmarkWriter::new(dir.path());
        writer
            .write(&BookmarkRecord::new("Test", "https://example.com").with_category("test"))
            .unwrap();
        writer
            .write(
                &BookmarkRecord::new("Rust Book", "https://doc.rust-lang.org/book")
                    .with_category("dev/rust")
                    .with_tags("reading"),
            )
            .unwrap();
        writer
            .write(&BookmarkRecord::new("Cargo", "https://doc.rust-lang.org/cargo").with_category("dev/rust"))
            .unwrap();
        let service = SearchService::new(dir.path());
        (dir, service)
    }

    #[test]
    fn test_round_trip_through_writer() {
        let (_dir, service) = seeded();

        for query in ["test", "example.com"] {
            let results = service.search(query, DEFAULT_SEARCH_LIMIT);
            assert_eq!(results.len(), 1, "query {query}");
            let hit = &results[0];
            assert_eq!(hit.title, "Test");
            assert_eq!(hit.url, "https://example.com");
            assert_eq!(hit.category, "test");
            assert!(hit.tags.contains(&"test".to_string()));
        }
    }

    #[test]
    fn test_short_queries_return_nothing() {
        let (_dir, service) = seeded();
        assert!(service.search("", 20).is_empty());
        assert!(service.search("ru", 20).is_empty());
        assert!(!service.search("rus", 20).is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let (_dir, service) = seeded();
        assert_eq!(service.search("RUST BOOK", 20).len(), 1);
    }

    #[test]
    fn test_category_is_immediate_parent() {
        let (_dir, service) = seeded();
        let results = service.search("reading", 20);
        assert_eq!(results[0].category, "rust");
        assert_eq!(results[0].tags, vec!["dev/rust", "reading"]);
    }

    #[test]
    fn test_limit_and_order() {
        let (_dir, service) = seeded();
        let all = service.search("rust-lang", 20);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Cargo");
        assert_eq!(all[1].title, "Rust Book");

        let one = service.search("rust-lang", 1);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].title, "Cargo");
        assert!(service.search("rust-lang", 0).is_empty());
    }

    #[test]
    fn test_ids_are_stable_and_distinct() {
        let (_dir, service) = seeded();
        let first = service.search("rust-lang", 20);
        let second = service.search("rust-lang", 20);
        assert_eq!(first[0].id, second[0].id);
        assert_ne!(first[0].id, first[1].id);
        assert_eq!(first[0].id.len(), ID_LENGTH);
    }

    #[test]
    fn test_hidden_and_foreign_files_are_ignored() {
        let (dir, service) = seeded();
        std::fs::write(dir.path().join("test/.draft.md"), "title: hidden needle").unwrap();
        std::fs::write(dir.path().join("test/notes.txt"), "needle").unwrap();
        std::fs::create_dir_all(dir.path().join(".trash")).unwrap();
        std::fs::write(dir.path().join(".trash/old.md"), "needle").unwrap();

        assert!(service.search("needle", 20).is_empty());
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let (dir, service) = seeded();
        // Not valid UTF-8, so reading it as text fails
        std::fs::write(dir.path().join("test/binary.md"), [0xff, 0xfe, 0x00]).unwrap();
        assert_eq!(service.search("example.com", 20).len(), 1);
    }

    #[test]
    fn test_missing_root() {
        let service = SearchService::new("/nonexistent/markstash/root");
        assert!(service.search("anything", 20).is_empty());
    }

    #[test]
    fn test_suggest_is_json_array() {
        let (_dir, service) = seeded();
        let json = service.suggest("example", 20).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["url"], "https://example.com");
        assert_eq!(parsed[0]["category"], "test");

        assert_eq!(service.suggest("ex", 20).unwrap(), "[]");
    }
}
