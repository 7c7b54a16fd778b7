//! CSV format adapter.
//!
//! The first row is a header. Columns are matched by name, case-insensitively,
//! using the same aliases as the JSON adapter; unknown columns are ignored.

use super::{FieldAliases, GENERIC_FIELDS};
use crate::io::traits::{ImportSource, SourceItem};
use crate::models::BookmarkRecord;
use crate::slug::slugify_path;
use crate::{Error, Result};
use std::io::Cursor;

/// CSV import source.
pub struct CsvImportSource {
    reader: csv::Reader<Cursor<Vec<u8>>>,
    column_map: ColumnMap,
    record: csv::StringRecord,
}

/// Column indices for each record field, in alias priority order.
#[derive(Debug, Default)]
struct ColumnMap {
    title: Vec<usize>,
    uri: Vec<usize>,
    category: Vec<usize>,
    tags: Vec<usize>,
    add_date: Vec<usize>,
    last_modified: Vec<usize>,
}

impl ColumnMap {
    /// Creates a column map from CSV headers.
    fn from_headers(headers: &csv::StringRecord, aliases: &FieldAliases) -> Result<Self> {
        let columns = |names: &[&str]| -> Vec<usize> {
            names
                .iter()
                .filter_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
                .collect()
        };

        let map = Self {
            title: columns(aliases.title),
            uri: columns(aliases.uri),
            category: columns(aliases.category),
            tags: columns(&["tags"]),
            add_date: columns(aliases.add_date),
            last_modified: columns(aliases.last_modified),
        };

        if map.uri.is_empty() {
            return Err(Error::InvalidInput(format!(
                "CSV must have a '{}' column",
                aliases.uri.join("', '")
            )));
        }

        Ok(map)
    }
}

impl CsvImportSource {
    /// Creates a new CSV import source over owned content.
    ///
    /// # Errors
    ///
    /// Returns an error if the header row cannot be read or has no URI column.
    pub fn new(content: String) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(Cursor::new(content.into_bytes()));

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::OperationFailed {
                operation: "read_csv_headers".to_string(),
                cause: e.to_string(),
            })?
            .clone();
        let column_map = ColumnMap::from_headers(&headers, &GENERIC_FIELDS)?;

        Ok(Self {
            reader: csv_reader,
            column_map,
            record: csv::StringRecord::new(),
        })
    }

    /// Maps the current row onto a record.
    fn parse_record(&self) -> BookmarkRecord {
        let get_field = |columns: &[usize]| -> Option<String> {
            columns
                .iter()
                .filter_map(|&i| self.record.get(i))
                .find(|s| !s.is_empty())
                .map(String::from)
        };

        BookmarkRecord {
            title: get_field(&self.column_map.title).unwrap_or_default(),
            uri: get_field(&self.column_map.uri).unwrap_or_default(),
            category: get_field(&self.column_map.category).map_or_else(
                || GENERIC_FIELDS.default_category.to_string(),
                |c| slugify_path(&c),
            ),
            tags: get_field(&self.column_map.tags).unwrap_or_default(),
            add_date: get_field(&self.column_map.add_date),
            last_modified: get_field(&self.column_map.last_modified),
        }
    }
}

impl ImportSource for CsvImportSource {
    fn next(&mut self) -> Result<Option<SourceItem>> {
        let has_record = self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| Error::OperationFailed {
                operation: "read_csv".to_string(),
                cause: e.to_string(),
            })?;
        if !has_record {
            return Ok(None);
        }

        Ok(Some(SourceItem::Record(self.parse_record())))
    }
}
