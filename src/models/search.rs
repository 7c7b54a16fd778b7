//! Search result types.

use serde::{Deserialize, Serialize};

/// A bookmark file that matched a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Stable identifier derived from the file's path under the root.
    pub id: String,
    /// The bookmark URI.
    pub url: String,
    /// The bookmark title.
    pub title: String,
    /// Tags in stored order.
    pub tags: Vec<String>,
    /// Name of the directory directly containing the file.
    pub category: String,
}
