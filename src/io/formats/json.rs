//! JSON format adapter.
//!
//! Accepted shapes:
//!
//! - a top-level array of bookmark objects
//! - an object holding such an array under `bookmarks` or `items`
//! - any other object, taken as a single bookmark

use super::{GENERIC_FIELDS, record_from_object};
use crate::io::traits::{ImportSource, SourceItem};
use crate::{Error, Result};
use serde_json::Value;

/// JSON import source.
///
/// The document is parsed up front; a malformed document is an error from
/// [`JsonImportSource::new`], while a non-object entry in the list is
/// reported as a malformed item.
pub struct JsonImportSource {
    items: std::vec::IntoIter<Value>,
    index: usize,
}

impl JsonImportSource {
    /// Creates a new JSON import source.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid JSON, is a scalar, or
    /// holds a `bookmarks`/`items` key that is not an array.
    pub fn new(content: &str) -> Result<Self> {
        let data: Value = serde_json::from_str(content)
            .map_err(|e| Error::InvalidInput(format!("Failed to parse JSON: {e}")))?;

        let items = match data {
            Value::Array(items) => items,
            Value::Object(mut object) => {
                match object.remove("bookmarks").or_else(|| object.remove("items")) {
                    Some(Value::Array(items)) => items,
                    Some(_) => {
                        return Err(Error::InvalidInput(
                            "JSON 'bookmarks'/'items' must be an array".to_string(),
                        ));
                    },
                    None => vec![Value::Object(object)],
                }
            },
            _ => {
                return Err(Error::InvalidInput(
                    "JSON import must be an array or an object".to_string(),
                ));
            },
        };

        Ok(Self {
            items: items.into_iter(),
            index: 0,
        })
    }
}

impl ImportSource for JsonImportSource {
    fn next(&mut self) -> Result<Option<SourceItem>> {
        let Some(item) = self.items.next() else {
            return Ok(None);
        };
        self.index += 1;

        let item = match item {
            Value::Object(object) => {
                SourceItem::Record(record_from_object(&object, &GENERIC_FIELDS))
            },
            other => SourceItem::Malformed {
                error: format!("Expected a bookmark object, found {}", json_kind(&other)),
                context: format!("item {}", self.index),
            },
        };
        Ok(Some(item))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
