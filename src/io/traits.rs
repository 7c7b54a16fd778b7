//! Core trait for import format adapters.

use crate::Result;
use crate::models::BookmarkRecord;

/// One item yielded by an [`ImportSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceItem {
    /// A normalized record.
    Record(BookmarkRecord),
    /// An entry that could not be mapped onto a record.
    ///
    /// Counted as a failed record; the import continues.
    Malformed {
        /// What was wrong with the entry.
        error: String,
        /// Where the entry was found (row, item index or id).
        context: String,
    },
}

/// Source of imported bookmarks.
///
/// Implementations parse one format (Netscape HTML, JSON, CSV, Pocket) and
/// yield items one at a time.
///
/// # Errors and items
///
/// A broken entry is reported as [`SourceItem::Malformed`] and does not stop
/// the import. An `Err` from [`ImportSource::next`] means the source itself is
/// unusable and aborts the whole import.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl ImportSource for JsonImportSource {
///     fn next(&mut self) -> Result<Option<SourceItem>> {
///         // Take the next buffered value, map its fields, return a record
///     }
///
///     fn size_hint(&self) -> Option<usize> {
///         Some(self.items.len())
///     }
/// }
/// ```
pub trait ImportSource {
    /// Reads the next item from the source.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying content cannot be read any further.
    fn next(&mut self) -> Result<Option<SourceItem>>;

    /// Returns an estimate of the remaining number of items.
    ///
    /// Returns `None` if unknown.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}
