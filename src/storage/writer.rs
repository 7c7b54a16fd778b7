//! Bookmark file writer.
//!
//! Turns one [`BookmarkRecord`] into `<root>/<category>/<slug>.md`.
//!
//! # Atomic creation
//!
//! Content is first written to a hidden temporary file in the target
//! directory, then published under its final name with a hard link. Linking
//! fails with `AlreadyExists` when the name is taken, which makes the
//! existence check and the write one step: two writers racing for the same
//! name can never overwrite each other, and a reader never sees a partially
//! written bookmark. The temporary file is removed in every case.

use crate::models::{BookmarkRecord, WrittenBookmark};
use crate::slug::{sanitize_filename, slugify, slugify_path};
use crate::storage::FrontMatter;
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Extension of bookmark files.
pub const BOOKMARK_EXTENSION: &str = "md";

/// Title used when a record has none.
pub const UNTITLED: &str = "Untitled";

/// Format of the suffix appended to a colliding file stem.
const COLLISION_SUFFIX_FORMAT: &str = "%Y%m%d_%H%M%S";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// What to do when the target file name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Retry once with a `_YYYYMMDD_HHMMSS` suffix; fail if that is taken too.
    #[default]
    Suffix,
    /// Fail immediately.
    Fail,
    /// Replace the existing file.
    Overwrite,
}

/// Per-write options.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// File name stem to use instead of the slugified title.
    pub name: Option<String>,
    /// Collision handling.
    pub collision: CollisionPolicy,
}

impl WriteOptions {
    /// Sets the collision policy.
    #[must_use]
    pub const fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    /// Sets an explicit file name (slugified before use).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Writes bookmark files under a root directory.
#[derive(Debug, Clone)]
pub struct BookmarkWriter {
    root: PathBuf,
}

impl BookmarkWriter {
    /// Creates a writer rooted at `root`.
    ///
    /// The root is created lazily together with the first category directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a record with the default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no URI, the category directory
    /// cannot be created, the file cannot be written, or both the plain and
    /// the suffixed file names are taken.
    pub fn write(&self, record: &BookmarkRecord) -> Result<WrittenBookmark> {
        self.write_with(record, &WriteOptions::default())
    }

    /// Writes a record.
    ///
    /// # Errors
    ///
    /// See [`BookmarkWriter::write`]. With [`CollisionPolicy::Fail`] an
    /// existing file is an error.
    pub fn write_with(
        &self,
        record: &BookmarkRecord,
        options: &WriteOptions,
    ) -> Result<WrittenBookmark> {
        let uri = record.uri.trim();
        if uri.is_empty() {
            return Err(Error::InvalidInput("URI cannot be empty".to_string()));
        }
        let title = match record.title.trim() {
            "" => UNTITLED,
            t => t,
        };

        let category = slugify_path(&record.category);
        let dir = category
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment));
        fs::create_dir_all(&dir).map_err(|e| Error::OperationFailed {
            operation: "create_category_dir".to_string(),
            cause: format!("{}: {e}", dir.display()),
        })?;

        let stem = options
            .name
            .as_deref()
            .map(|n| slugify(&sanitize_filename(n)))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| file_stem(title, uri));

        let tags = merge_tags(&category, record.tag_list());
        let content = FrontMatter {
            title: title.to_string(),
            uri: uri.to_string(),
            tags: tags.clone(),
            add_date: record.add_date.clone(),
            last_modified: record.last_modified.clone(),
        }
        .render();

        let path = publish(&dir, &stem, content.as_bytes(), options.collision)?;
        tracing::info!(path = %path.display(), "Created bookmark");

        Ok(WrittenBookmark {
            success: true,
            path,
            title: title.to_string(),
            uri: uri.to_string(),
            category,
            tags,
        })
    }
}

/// Derives the file stem from a title.
///
/// Titles that slug to nothing (for example, only CJK characters) fall back to
/// a short hash of the URI so the file still gets a usable name.
fn file_stem(title: &str, uri: &str) -> String {
    let stem = slugify(&sanitize_filename(title));
    if !stem.is_empty() {
        return stem;
    }
    let digest = Sha256::digest(uri.as_bytes());
    format!("bookmark-{}", &hex::encode(digest)[..12])
}

/// Builds the stored tag list: the category first, then the record's tags,
/// without duplicates.
fn merge_tags(category: &str, tags: Vec<String>) -> Vec<String> {
    let mut merged = vec![category.to_string()];
    for tag in tags {
        if !merged.contains(&tag) {
            merged.push(tag);
        }
    }
    merged
}

/// Writes `content` under `dir/<stem>.md` according to `policy`.
fn publish(dir: &Path, stem: &str, content: &[u8], policy: CollisionPolicy) -> Result<PathBuf> {
    let temp = TempFile::create(dir, stem, content)?;
    let target = dir.join(format!("{stem}.{BOOKMARK_EXTENSION}"));

    match policy {
        CollisionPolicy::Overwrite => {
            fs::rename(&temp.path, &target).map_err(|e| write_failed(&target, &e))?;
            temp.disarm();
            Ok(target)
        },
        CollisionPolicy::Fail => match temp.link_to(&target) {
            Ok(()) => Ok(target),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::OperationFailed {
                operation: "write_bookmark_file".to_string(),
                cause: format!("File already exists: {}", target.display()),
            }),
            Err(e) => Err(write_failed(&target, &e)),
        },
        CollisionPolicy::Suffix => match temp.link_to(&target) {
            Ok(()) => Ok(target),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let suffix = chrono::Local::now().format(COLLISION_SUFFIX_FORMAT);
                let retry = dir.join(format!("{stem}_{suffix}.{BOOKMARK_EXTENSION}"));
                tracing::debug!(
                    existing = %target.display(),
                    retry = %retry.display(),
                    "Bookmark file exists, retrying with timestamp suffix"
                );
                match temp.link_to(&retry) {
                    Ok(()) => Ok(retry),
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        Err(Error::OperationFailed {
                            operation: "write_bookmark_file".to_string(),
                            cause: format!(
                                "File already exists: {} (and {})",
                                target.display(),
                                retry.display()
                            ),
                        })
                    },
                    Err(e) => Err(write_failed(&retry, &e)),
                }
            },
            Err(e) => Err(write_failed(&target, &e)),
        },
    }
}

fn write_failed(path: &Path, e: &std::io::Error) -> Error {
    Error::OperationFailed {
        operation: "write_bookmark_file".to_string(),
        cause: format!("{}: {e}", path.display()),
    }
}

/// Hidden temporary file, removed on drop unless disarmed.
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn create(dir: &Path, stem: &str, content: &[u8]) -> Result<Self> {
        let nonce = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!(".{stem}.{}.{nonce}.tmp", std::process::id()));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| write_failed(&path, &e))?;
        let temp = Self { path, armed: true };
        file.write_all(content)
            .and_then(|()| file.sync_all())
            .map_err(|e| write_failed(&temp.path, &e))?;

        Ok(temp)
    }

    fn link_to(&self, target: &Path) -> std::io::Result<()> {
        fs::hard_link(&self.path, target)
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove temporary file");
            }
        }
    }
}
