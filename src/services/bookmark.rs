//! Manual bookmark creation.
//!
//! Unlike bulk import, adding a single bookmark checks that the target is
//! reachable: URLs are requested (following redirects) and must answer with a
//! 2xx or 3xx status, local paths must exist and be readable. Missing titles
//! are filled from the page `<title>` or the file name.

use super::probe::UriProbe;
use crate::models::{BookmarkRecord, WrittenBookmark};
use crate::storage::{BookmarkWriter, CollisionPolicy, WriteOptions};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Category for local files when none is given.
pub const FILES_CATEGORY: &str = "files";

/// What kind of target a URI names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriKind {
    /// `http://` or `https://` URL.
    Url,
    /// Filesystem path starting with `/`, `~` or `.`.
    LocalPath,
    /// `file://` URI.
    FileUri,
    /// Anything else; never reachable.
    Other,
}

impl UriKind {
    /// Classifies a URI.
    #[must_use]
    pub fn classify(uri: &str) -> Self {
        let lower = uri.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url
        } else if lower.starts_with("file://") {
            Self::FileUri
        } else if uri.starts_with(['/', '~', '.']) {
            Self::LocalPath
        } else {
            Self::Other
        }
    }

    /// Returns whether the URI names something on the local filesystem.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::LocalPath | Self::FileUri)
    }
}

/// A request to add one bookmark.
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    /// URL, path or `file://` URI.
    pub uri: String,
    /// Title; looked up when absent.
    pub title: Option<String>,
    /// Category path; `files` or `unsorted` when absent.
    pub category: Option<String>,
    /// Comma-joined tags.
    pub tags: Option<String>,
    /// File name to use instead of the title.
    pub name: Option<String>,
    /// Replace an existing file of the same name.
    pub force: bool,
}

impl AddRequest {
    /// Creates a request for `uri`.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Sets the file name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Enables or disables overwriting.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Creates bookmarks one at a time.
pub struct BookmarkService {
    writer: BookmarkWriter,
    probe: Box<dyn UriProbe>,
}

impl BookmarkService {
    /// Creates a service writing through `writer` and probing URLs with `probe`.
    #[must_use]
    pub fn new(writer: BookmarkWriter, probe: Box<dyn UriProbe>) -> Self {
        Self { writer, probe }
    }

    /// Adds a bookmark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the URI is empty, unreachable, or no
    /// title can be found, [`Error::NotFound`] if a local path does not exist,
    /// and [`Error::OperationFailed`] if the file exists (without `force`) or
    /// cannot be written.
    pub fn add(&self, request: &AddRequest) -> Result<WrittenBookmark> {
        let uri = request.uri.trim();
        if uri.is_empty() {
            return Err(Error::InvalidInput("URI cannot be empty".to_string()));
        }

        let kind = UriKind::classify(uri);
        let (uri, found_title) = match kind {
            UriKind::Url => self.resolve_url(uri)?,
            UriKind::LocalPath | UriKind::FileUri => resolve_path(uri)?,
            UriKind::Other => {
                return Err(Error::InvalidInput(format!("URI is not accessible: {uri}")));
            },
        };

        let category = non_empty(request.category.as_deref()).unwrap_or(if kind.is_file() {
            FILES_CATEGORY
        } else {
            crate::slug::DEFAULT_CATEGORY
        });

        let title = non_empty(request.title.as_deref())
            .map(String::from)
            .or(found_title)
            .or_else(|| last_segment(&uri))
            .ok_or_else(|| Error::InvalidInput(format!("Title cannot be empty for {uri}")))?;

        let record = BookmarkRecord::new(title, uri)
            .with_category(category)
            .with_tags(request.tags.clone().unwrap_or_default())
            .with_add_date(chrono::Utc::now().timestamp().to_string());

        let mut options = WriteOptions::default().with_collision(if request.force {
            CollisionPolicy::Overwrite
        } else {
            CollisionPolicy::Fail
        });
        if let Some(name) = non_empty(request.name.as_deref()) {
            options = options.with_name(name);
        }

        let written = self.writer.write_with(&record, &options)?;
        info!(uri = %written.uri, category = %written.category, "Added bookmark");
        Ok(written)
    }

    /// Follows redirects and checks the status; returns the final URL and
    /// the page title.
    fn resolve_url(&self, url: &str) -> Result<(String, Option<String>)> {
        let page = self
            .probe
            .probe(url)
            .map_err(|e| Error::InvalidInput(format!("URI is not accessible: {url} ({e})")))?;
        if !page.is_accessible() {
            return Err(Error::InvalidInput(format!(
                "URI is not accessible: {} (status {})",
                page.final_url, page.status
            )));
        }
        Ok((page.final_url, page.title))
    }
}

/// Expands and canonicalizes a local path; returns it with its file name.
fn resolve_path(uri: &str) -> Result<(String, Option<String>)> {
    let cwd = std::env::current_dir().map_err(|e| Error::OperationFailed {
        operation: "current_dir".to_string(),
        cause: e.to_string(),
    })?;
    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    let expanded = expand_path(uri, &cwd, home.as_deref());

    let resolved = fs::canonicalize(&expanded).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(expanded.display().to_string()),
        _ => Error::InvalidInput(format!("URI is not accessible: {} ({e})", expanded.display())),
    })?;
    if !is_readable(&resolved) {
        return Err(Error::InvalidInput(format!(
            "URI is not accessible: {}",
            resolved.display()
        )));
    }

    let name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    Ok((resolved.to_string_lossy().into_owned(), name))
}

/// Expands `~`, `.`/`..` prefixes and `file://` URIs into a path.
pub(crate) fn expand_path(uri: &str, cwd: &Path, home: Option<&Path>) -> PathBuf {
    if let Some(rest) = uri
        .get(..7)
        .filter(|scheme| scheme.eq_ignore_ascii_case("file://"))
        .and_then(|_| uri.get(7..))
    {
        let decoded = urlencoding::decode_binary(rest.as_bytes());
        return PathBuf::from(String::from_utf8_lossy(&decoded).as_ref());
    }
    if uri == "." {
        return cwd.to_path_buf();
    }
    if uri == ".." {
        return cwd.join("..");
    }
    if let Some(rest) = uri.strip_prefix("./") {
        return cwd.join(rest);
    }
    if let Some(rest) = uri.strip_prefix("../") {
        return cwd.join("..").join(rest);
    }
    if let (Some(rest), Some(home)) = (uri.strip_prefix('~'), home) {
        return home.join(rest.trim_start_matches('/'));
    }
    PathBuf::from(uri)
}

fn is_readable(path: &Path) -> bool {
    if path.is_dir() {
        fs::read_dir(path).is_ok()
    } else {
        fs::File::open(path).is_ok()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Last path segment of a URI, ignoring trailing slashes.
fn last_segment(uri: &str) -> Option<String> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.ends_with(':'))
        .map(String::from)
}
