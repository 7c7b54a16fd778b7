//! Bookmark import service.
//!
//! Resolves the format, runs the matching adapter and writes each record.
//! Every entry point returns an [`ImportResult`]: per-record problems are
//! collected in `errors`, and problems with the file as a whole (missing,
//! too large, not decodable, unknown format) produce a single-error result
//! with `total = 0, failed = 1`.

use crate::config::DEFAULT_MAX_IMPORT_SIZE;
use crate::io::formats::{Format, create_import_source, detect_format};
use crate::io::traits::{ImportSource, SourceItem};
use crate::models::{BookmarkRecord, ImportErrorEntry, ImportResult, ImportedEntry};
use crate::storage::BookmarkWriter;
use crate::{Error, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::{error, info, instrument, warn};

/// Options for bookmark import.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Explicit format; detected from the content when `None`.
    pub format: Option<Format>,
    /// Parse and report without writing any file.
    pub dry_run: bool,
}

impl ImportOptions {
    /// Sets an explicit format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Enables or disables dry run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Service for importing bookmarks from export files.
#[derive(Debug, Clone)]
pub struct ImportService {
    writer: BookmarkWriter,
    max_import_size: u64,
}

impl ImportService {
    /// Creates a new import service writing through `writer`.
    #[must_use]
    pub const fn new(writer: BookmarkWriter) -> Self {
        Self {
            writer,
            max_import_size: DEFAULT_MAX_IMPORT_SIZE,
        }
    }

    /// Sets the largest accepted import, in bytes.
    #[must_use]
    pub const fn with_max_import_size(mut self, max_import_size: u64) -> Self {
        self.max_import_size = max_import_size;
        self
    }

    /// Imports a file with a format given by name.
    ///
    /// `format` is one of `html`, `json`, `csv` or `pocket`; `None` (or an
    /// empty string) means detect. An unknown name is reported in the result.
    pub fn import_file_with(
        &self,
        path: &Path,
        format: Option<&str>,
        dry_run: bool,
    ) -> ImportResult {
        let format = match format.map(str::trim).filter(|f| !f.is_empty()) {
            None => None,
            Some(name) => match Format::from_str(name) {
                Ok(format) => Some(format),
                Err(_) => return unsupported(name),
            },
        };
        self.import_file(
            path,
            &ImportOptions {
                format,
                dry_run,
            },
        )
    }

    /// Imports a file.
    #[instrument(skip(self, path, options), fields(path = %path.display(), dry_run = options.dry_run))]
    pub fn import_file(&self, path: &Path, options: &ImportOptions) -> ImportResult {
        match self.read_file(path) {
            Ok(bytes) => self.import_bytes(&bytes, options),
            Err(Error::NotFound(path)) => file_failure(&format!("File not found: {path}")),
            Err(e) => file_failure(&e.to_string()),
        }
    }

    /// Imports content that is already in memory, such as an upload.
    pub fn import_bytes(&self, bytes: &[u8], options: &ImportOptions) -> ImportResult {
        if bytes.len() as u64 > self.max_import_size {
            return file_failure(&too_large(bytes.len() as u64, self.max_import_size));
        }

        let Some(format) = options.format.or_else(|| detect_format(bytes)) else {
            return unsupported("unknown");
        };
        info!(format = %format, dry_run = options.dry_run, "Importing bookmarks");

        let outcome = decode(bytes)
            .and_then(|content| create_import_source(content, format))
            .and_then(|mut source| self.import_from_source(source.as_mut(), options.dry_run));

        match outcome {
            Ok(result) => {
                if result.has_errors() {
                    warn!(
                        total = result.total,
                        success = result.success,
                        failed = result.failed,
                        "Import finished with errors"
                    );
                } else {
                    info!(total = result.total, success = result.success, "Import finished");
                }
                result
            },
            Err(e) => file_failure(&format!("Failed to import {format} bookmarks: {e}")),
        }
    }

    /// Drains a source, writing each record unless `dry_run` is set.
    ///
    /// Records without a URI fail in dry runs too, so a dry run predicts the
    /// real import's counts.
    ///
    /// # Errors
    ///
    /// Returns an error only if the source itself fails; per-record failures
    /// are collected in the result.
    pub fn import_from_source(
        &self,
        source: &mut dyn ImportSource,
        dry_run: bool,
    ) -> Result<ImportResult> {
        let mut result = ImportResult::new();
        result.imported.reserve(source.size_hint().unwrap_or_default());

        while let Some(item) = source.next()? {
            let record = match item {
                SourceItem::Record(record) => record,
                SourceItem::Malformed { error, context } => {
                    warn!(%context, %error, "Skipping malformed entry");
                    result.push_failure(ImportErrorEntry::new(error).with_context(context));
                    continue;
                },
            };

            if !record.has_uri() {
                warn!(title = %record.title, "Skipping bookmark without URI");
                result.push_failure(
                    ImportErrorEntry::new("URI cannot be empty").with_context(record_context(&record)),
                );
                continue;
            }

            if dry_run {
                result.push_success(ImportedEntry::Record(record));
                continue;
            }

            match self.writer.write(&record) {
                Ok(written) => result.push_success(ImportedEntry::Written(written)),
                Err(e) => {
                    warn!(uri = %record.uri, error = %e, "Failed to write bookmark");
                    result.push_failure(
                        ImportErrorEntry::new(e.to_string()).with_context(record_context(&record)),
                    );
                },
            }
        }

        Ok(result)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            _ => Error::OperationFailed {
                operation: "stat_import_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            },
        })?;
        if metadata.len() > self.max_import_size {
            return Err(Error::InvalidInput(too_large(
                metadata.len(),
                self.max_import_size,
            )));
        }

        std::fs::read(path).map_err(|e| Error::OperationFailed {
            operation: "read_import_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }
}

/// Decodes import content as UTF-8, dropping a byte order mark.
fn decode(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::InvalidInput(format!("Import file is not valid UTF-8: {e}")))
}

fn record_context(record: &BookmarkRecord) -> String {
    match (record.title.is_empty(), record.uri.is_empty()) {
        (false, false) => format!("{} ({})", record.title, record.uri),
        (false, true) => record.title.clone(),
        (true, false) => record.uri.clone(),
        (true, true) => format!("record in {}", record.category),
    }
}

fn too_large(size: u64, limit: u64) -> String {
    format!("Import file is too large: {size} bytes (limit {limit})")
}

fn file_failure(message: &str) -> ImportResult {
    error!(error = %message, "Import failed");
    ImportResult::failure(message)
}

fn unsupported(format: &str) -> ImportResult {
    file_failure(&format!("Unsupported format: {format}"))
}
