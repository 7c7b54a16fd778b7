//! Netscape bookmark file adapter.
//!
//! The Netscape format puts one folder or bookmark per line:
//!
//! ```text
//! <DL><p>
//!     <DT><H3 ADD_DATE="1700000000">Dev</H3>
//!     <DL><p>
//!         <DT><A HREF="https://www.rust-lang.org" TAGS="rust">Rust</A>
//!     </DL><p>
//! </DL><p>
//! ```
//!
//! Parsing is a line-by-line state machine over a [`FolderStack`]; no DOM is
//! built. Tags that wrap onto following lines are joined into one logical
//! line first.

use crate::Result;
use crate::io::traits::{ImportSource, SourceItem};
use crate::models::BookmarkRecord;
use crate::slug::{DEFAULT_CATEGORY, slugify};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// Maximum number of extra lines joined onto a tag left open at line end.
pub const MAX_TAG_CONTINUATION: usize = 16;

static FOLDER_PATTERN: LazyLock<Regex> =
    lazy_regex!(r"(?i)<dt>\s*<h3\b[^>]*>([^<]*)</h3\s*>");
static BOOKMARK_PATTERN: LazyLock<Regex> =
    lazy_regex!(r"(?i)<dt>\s*<a\b([^>]*)>([^<]*)</a\s*>");
static FOLDER_CLOSE_PATTERN: LazyLock<Regex> = lazy_regex!(r"(?i)</dl\s*>");

static FOLDER_OPEN: LazyLock<Regex> = lazy_regex!(r"(?i)<dt>\s*<h3\b");
static FOLDER_END: LazyLock<Regex> = lazy_regex!(r"(?i)</h3\s*>");
static ANCHOR_OPEN: LazyLock<Regex> = lazy_regex!(r"(?i)<dt>\s*<a\b");
static ANCHOR_END: LazyLock<Regex> = lazy_regex!(r"(?i)</a\s*>");
static ENTRY_START: LazyLock<Regex> = lazy_regex!(r"(?i)<dt\b");

static HREF_ATTR: LazyLock<Regex> = lazy_regex!(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#);
static ADD_DATE_ATTR: LazyLock<Regex> =
    lazy_regex!(r#"(?i)\badd_date\s*=\s*(?:"([^"]*)"|'([^']*)')"#);
static LAST_MODIFIED_ATTR: LazyLock<Regex> =
    lazy_regex!(r#"(?i)\blast_modified\s*=\s*(?:"([^"]*)"|'([^']*)')"#);
static TAGS_ATTR: LazyLock<Regex> = lazy_regex!(r#"(?i)\btags\s*=\s*(?:"([^"]*)"|'([^']*)')"#);

static ENTITY: LazyLock<Regex> = lazy_regex!(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);");

/// What one logical line did to the parser state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A folder was opened; holds its slug.
    FolderOpened(String),
    /// A bookmark in the current folder.
    Bookmark(BookmarkRecord),
    /// The innermost folder was closed.
    FolderClosed,
    /// The line carried nothing of interest.
    Ignored,
}

/// Folder nesting state of the HTML parser.
///
/// # Example
///
/// ```rust
/// use markstash::io::formats::html::{FolderStack, LineEvent};
///
/// let mut stack = FolderStack::new();
/// stack.step("<DT><H3>Dev Tools</H3>");
/// assert_eq!(stack.category(), "dev-tools");
///
/// stack.step("</DL><p>");
/// assert_eq!(stack.category(), "unsorted");
///
/// // Unbalanced closes are harmless
/// assert_eq!(stack.step("</DL>"), LineEvent::FolderClosed);
/// assert_eq!(stack.category(), "unsorted");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FolderStack {
    folders: Vec<String>,
}

impl FolderStack {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            folders: Vec::new(),
        }
    }

    /// Returns the number of open folders.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.folders.len()
    }

    /// Returns the category path for bookmarks at the current position.
    ///
    /// Folders whose names slug to nothing still occupy a stack slot (so
    /// their closing marker pops the right entry) but add no path segment.
    #[must_use]
    pub fn category(&self) -> String {
        let segments: Vec<&str> = self
            .folders
            .iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            segments.join("/")
        }
    }

    /// Advances the state by one logical line.
    ///
    /// Markers are tried in order: folder open, bookmark, folder close. A
    /// line that opens a folder or holds a bookmark is never also treated as
    /// a close.
    pub fn step(&mut self, line: &str) -> LineEvent {
        if let Some(caps) = FOLDER_PATTERN.captures(line) {
            let name = decode_entities(caps.get(1).map_or("", |m| m.as_str()));
            let slug = slugify(&name);
            self.folders.push(slug.clone());
            return LineEvent::FolderOpened(slug);
        }

        if let Some(caps) = BOOKMARK_PATTERN.captures(line) {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let title = decode_entities(caps.get(2).map_or("", |m| m.as_str()));
            let href = attribute(&HREF_ATTR, attrs).unwrap_or_default();
            let href = decode_entities(&href);
            let uri = String::from_utf8_lossy(&urlencoding::decode_binary(href.as_bytes()))
                .trim()
                .to_string();

            let record = BookmarkRecord {
                title: title.trim().to_string(),
                uri,
                category: self.category(),
                tags: attribute(&TAGS_ATTR, attrs)
                    .map(|t| decode_entities(&t))
                    .unwrap_or_default(),
                add_date: attribute(&ADD_DATE_ATTR, attrs).filter(|d| !d.is_empty()),
                last_modified: attribute(&LAST_MODIFIED_ATTR, attrs).filter(|d| !d.is_empty()),
            };
            return LineEvent::Bookmark(record);
        }

        if FOLDER_CLOSE_PATTERN.is_match(line) {
            self.folders.pop();
            return LineEvent::FolderClosed;
        }

        LineEvent::Ignored
    }
}

/// Import source over a Netscape bookmark file.
pub struct HtmlImportSource {
    lines: std::vec::IntoIter<String>,
    stack: FolderStack,
}

impl HtmlImportSource {
    /// Creates a source over the given content.
    #[must_use]
    pub fn new(content: &str) -> Self {
        Self {
            lines: logical_lines(content).into_iter(),
            stack: FolderStack::new(),
        }
    }
}

impl ImportSource for HtmlImportSource {
    fn next(&mut self) -> Result<Option<SourceItem>> {
        for line in self.lines.by_ref() {
            match self.stack.step(&line) {
                LineEvent::Bookmark(record) => return Ok(Some(SourceItem::Record(record))),
                LineEvent::FolderOpened(slug) => {
                    debug!(folder = %slug, depth = self.stack.depth(), "Entered folder");
                },
                LineEvent::FolderClosed => {
                    debug!(depth = self.stack.depth(), "Left folder");
                },
                LineEvent::Ignored => {},
            }
        }
        Ok(None)
    }
}

/// Splits content into logical lines.
///
/// A line that opens a folder or bookmark tag without closing it is joined
/// with the following lines (trimmed, space separated) until the closing tag
/// shows up, for at most [`MAX_TAG_CONTINUATION`] extra lines. Only plain
/// continuation lines are absorbed: if a new `<dt>` entry or a `</dl>` comes
/// first, or the closing tag never does, the line is kept as is.
fn logical_lines(content: &str) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let end = unclosed_tag_end(line).and_then(|closing| continuation_end(&lines, i, closing));

        match end {
            Some(end) => {
                let joined = lines[i..=end]
                    .iter()
                    .map(|l| l.trim())
                    .collect::<Vec<_>>()
                    .join(" ");
                out.push(joined);
                i = end + 1;
            },
            None => {
                out.push(line.to_string());
                i += 1;
            },
        }
    }

    out
}

/// Finds the line that closes the tag left open on line `start`.
fn continuation_end(lines: &[&str], start: usize, closing: &Regex) -> Option<usize> {
    for (j, next) in lines.iter().enumerate().skip(start + 1).take(MAX_TAG_CONTINUATION) {
        if closing.is_match(next) {
            return Some(j);
        }
        if ENTRY_START.is_match(next) || FOLDER_CLOSE_PATTERN.is_match(next) {
            return None;
        }
    }
    None
}

/// Returns the closing pattern a line is waiting for, if any.
fn unclosed_tag_end(line: &str) -> Option<&'static Regex> {
    if FOLDER_OPEN.is_match(line) && !FOLDER_END.is_match(line) {
        return Some(&*FOLDER_END);
    }
    if ANCHOR_OPEN.is_match(line) && !ANCHOR_END.is_match(line) {
        return Some(&*ANCHOR_END);
    }
    None
}

/// Reads a quoted attribute value.
fn attribute(pattern: &Regex, attrs: &str) -> Option<String> {
    pattern
        .captures(attrs)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
}

/// Decodes the HTML entities found in bookmark exports.
///
/// Unknown named entities and invalid code points are left untouched.
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let name = caps.get(1).map_or("", |m| m.as_str());
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(std::result::Result::ok)
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| whole.to_string(), String::from)
        })
        .into_owned()
}
