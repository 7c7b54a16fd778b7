//! Bookmark import subsystem.
//!
//! Turns browser and service exports into bookmark files.
//!
//! # Architecture
//!
//! - **Format adapters** implement [`ImportSource`] and yield normalized
//!   records one at a time
//! - **Detection** sniffs the first kilobyte when no format is given
//! - **The import service** drives an adapter and hands each record to the
//!   [`BookmarkWriter`](crate::storage::BookmarkWriter)
//!
//! # Supported Formats
//!
//! | Format | Shape | Category from |
//! |--------|-------|---------------|
//! | HTML | Netscape bookmark file | Folder nesting |
//! | JSON | Array, `{bookmarks}`, `{items}` or one object | `category` / `folder` |
//! | CSV | Header row plus rows | `category` / `folder` column |
//! | Pocket | Item mapping, optionally under `list` | Always `pocket` unless given |
//!
//! # Example
//!
//! ```rust,ignore
//! use markstash::io::{ImportOptions, ImportService};
//! use markstash::storage::BookmarkWriter;
//!
//! let service = ImportService::new(BookmarkWriter::new("/data/bookmarks"));
//! let result = service.import_file(
//!     "bookmarks.html".as_ref(),
//!     &ImportOptions::default().with_dry_run(true),
//! );
//! println!("{} of {} would be imported", result.success, result.total);
//! ```

pub mod formats;
pub mod services;
pub mod traits;

// Re-exports for convenience
pub use formats::{Format, detect_file_format, detect_format};
pub use services::import::{ImportOptions, ImportService};
pub use traits::{ImportSource, SourceItem};
