//! # Markstash
//!
//! A personal bookmark collection kept as plain Markdown files.
//!
//! Every bookmark lives in its own file under a category directory, with a
//! small front matter block (`title`, `uri`, `tags`, optional dates) followed
//! by a one-line Markdown link. There is no index: search walks the tree.
//!
//! ## Features
//!
//! - Import from Netscape HTML exports, JSON, CSV and Pocket exports
//! - Format sniffing when no explicit format is given
//! - Collision-safe, atomic file creation
//! - Case-insensitive content search with bounded result sets
//!
//! ## Example
//!
//! ```rust,ignore
//! use markstash::{BookmarkWriter, ImportOptions, ImportService, SearchService};
//!
//! let importer = ImportService::new(BookmarkWriter::new("/data/bookmarks"));
//! let result = importer.import_file("bookmarks.html".as_ref(), &ImportOptions::default());
//! println!("{} of {} imported", result.success, result.total);
//!
//! let hits = SearchService::new("/data/bookmarks").search("rust", 20);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

/// Creates a compile-time verified regex wrapped in `LazyLock`.
///
/// Patterns are literals covered by tests, so the `unreachable!()` branch
/// exists only for type checking.
macro_rules! lazy_regex {
    ($pattern:expr) => {
        ::std::sync::LazyLock::new(|| {
            ::regex::Regex::new($pattern).unwrap_or_else(|_| unreachable!())
        })
    };
}

// Module declarations
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod slug;
pub mod storage;

// Re-exports for convenience
pub use config::MarkstashConfig;
pub use io::{Format, ImportOptions, ImportService, detect_format};
pub use models::{
    BookmarkRecord, ImportErrorEntry, ImportResult, ImportedEntry, SearchResult, WrittenBookmark,
};
pub use services::{AddRequest, BookmarkService, HttpProbe, SearchService, UriProbe};
pub use slug::slugify;
pub use storage::{BookmarkWriter, CollisionPolicy, FrontMatter, WriteOptions};

/// Error type for markstash operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty URI, malformed import content, inaccessible URI |
/// | `OperationFailed` | Filesystem I/O errors, HTTP client setup, config parsing |
/// | `NotFound` | Import file or local bookmark target does not exist |
/// | `UnsupportedFormat` | Format name is not one of `html`, `json`, `csv`, `pocket` |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A bookmark has no URI
    /// - Import content is not valid JSON/CSV at the top level
    /// - A manually added URI cannot be reached
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Category directories cannot be created
    /// - Bookmark files cannot be written
    /// - The target file name is already taken
    /// - Configuration files cannot be read or parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A referenced file does not exist.
    ///
    /// Raised when:
    /// - The file given to an import is missing
    /// - A local path or `file://` URI being added does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The import format is unknown or could not be detected.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for markstash operations.
pub type Result<T> = std::result::Result<T, Error>;
