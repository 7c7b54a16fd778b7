//! Business logic services.
//!
//! Search over the bookmark tree and manual, probe-checked bookmark creation.
//! Bulk import lives in [`crate::io`].

mod bookmark;
mod probe;
mod search;

pub use bookmark::{AddRequest, BookmarkService, FILES_CATEGORY, UriKind};
pub use probe::{HttpProbe, PageInfo, UriProbe};
pub use search::{DEFAULT_SEARCH_LIMIT, MIN_QUERY_CHARS, SearchService};
