//! On-disk bookmark storage.
//!
//! One Markdown file per bookmark, grouped in category directories:
//!
//! ```text
//! <root>/
//! ├── unsorted/
//! │   └── example.md
//! └── dev/
//!     └── rust/
//!         └── the-rust-book.md
//! ```

mod front_matter;
mod writer;

pub use front_matter::{DELIMITER, FrontMatter};
pub use writer::{
    BOOKMARK_EXTENSION, BookmarkWriter, CollisionPolicy, UNTITLED, WriteOptions,
};
