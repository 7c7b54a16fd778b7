//! Data models for markstash.
//!
//! Transient records produced by the importers, the aggregated import report,
//! and the search result shape.

mod bookmark;
mod import;
mod search;

pub use bookmark::BookmarkRecord;
pub(crate) use bookmark::split_tags;
pub use import::{ImportErrorEntry, ImportResult, ImportedEntry, WrittenBookmark};
pub use search::SearchResult;
