//! Pocket export adapter.
//!
//! Pocket exports are a mapping of opaque item ids to item objects, either at
//! the top level or under `list`:
//!
//! ```json
//! {"status": 1, "list": {"229279689": {
//!     "given_url": "https://example.com", "resolved_title": "Example",
//!     "time_added": "1700000000", "tags": {"news": {}, "tech": {}}
//! }}}
//! ```
//!
//! Items are yielded in the order the decoded mapping iterates, which is not
//! guaranteed to match the file.

use super::{POCKET_FIELDS, record_from_object};
use crate::io::traits::{ImportSource, SourceItem};
use crate::{Error, Result};
use serde_json::Value;

/// Pocket import source.
pub struct PocketImportSource {
    items: std::vec::IntoIter<(String, Value)>,
}

impl PocketImportSource {
    /// Creates a new Pocket import source.
    ///
    /// An empty `list` may also be encoded as an array, so arrays are
    /// accepted and keyed by position.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid JSON or holds no item
    /// mapping.
    pub fn new(content: &str) -> Result<Self> {
        let mut data: Value = serde_json::from_str(content)
            .map_err(|e| Error::InvalidInput(format!("Failed to parse Pocket export: {e}")))?;

        let list = data.get_mut("list").map(Value::take);
        let items = list.unwrap_or(data);

        let items: Vec<(String, Value)> = match items {
            Value::Object(map) => map.into_iter().collect(),
            Value::Array(list) => list
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item))
                .collect(),
            _ => {
                return Err(Error::InvalidInput(
                    "Pocket export must be a mapping of items".to_string(),
                ));
            },
        };

        Ok(Self {
            items: items.into_iter(),
        })
    }
}

impl ImportSource for PocketImportSource {
    fn next(&mut self) -> Result<Option<SourceItem>> {
        let Some((id, item)) = self.items.next() else {
            return Ok(None);
        };

        let item = match item {
            Value::Object(object) => {
                SourceItem::Record(record_from_object(&object, &POCKET_FIELDS))
            },
            _ => SourceItem::Malformed {
                error: "Expected a Pocket item object".to_string(),
                context: format!("item {id}"),
            },
        };
        Ok(Some(item))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}
