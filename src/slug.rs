//! Slug normalization for file names and category paths.
//!
//! A slug is the lowercase, hyphen-delimited ASCII form of arbitrary text.
//! Accented letters are reduced to their base letter (NFKD decomposition with
//! non-ASCII code points dropped), every run of other characters becomes a
//! single hyphen, and hyphens never lead or trail.

use unicode_normalization::UnicodeNormalization;

/// Category used when a record has none.
pub const DEFAULT_CATEGORY: &str = "unsorted";

/// Maximum number of characters kept from a title before slugging.
pub const MAX_TITLE_CHARS: usize = 200;

/// Converts text to a slug.
///
/// The result always matches `[a-z0-9]+(-[a-z0-9]+)*` or is empty, and
/// `slugify(&slugify(x)) == slugify(x)` holds for every input.
///
/// # Examples
///
/// ```rust
/// use markstash::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("Café Crème"), "cafe-creme");
/// assert_eq!(slugify("--Rust  2024--"), "rust-2024");
/// assert_eq!(slugify(""), "");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.nfkd().filter(char::is_ascii) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Slugifies a `/`-separated category path segment by segment.
///
/// Segments that slug to nothing (including `.` and `..`) are dropped, so the
/// result can always be joined under a storage root. An empty result falls
/// back to [`DEFAULT_CATEGORY`].
///
/// ```rust
/// use markstash::slug::slugify_path;
///
/// assert_eq!(slugify_path("Dev Tools/Rust Crates"), "dev-tools/rust-crates");
/// assert_eq!(slugify_path("../etc"), "etc");
/// assert_eq!(slugify_path("  "), "unsorted");
/// ```
#[must_use]
pub fn slugify_path(category: &str) -> String {
    let segments: Vec<String> = category
        .split('/')
        .map(slugify)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        segments.join("/")
    }
}

/// Replaces characters that are unsafe in file names and caps the length.
///
/// The output is meant to be slugged afterwards; it is never used as a file
/// name directly.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .take(MAX_TITLE_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Test", "test" ; "single word")]
    #[test_case("Hello World", "hello-world" ; "space")]
    #[test_case("  padded  ", "padded" ; "outer whitespace")]
    #[test_case("a---b", "a-b" ; "hyphen runs")]
    #[test_case("Rust & Go: A Comparison", "rust-go-a-comparison" ; "punctuation")]
    #[test_case("Ünïcödé", "unicode" ; "diacritics")]
    #[test_case("日本語", "" ; "no ascii transliteration")]
    #[test_case("a日b", "ab" ; "dropped characters do not split")]
    #[test_case("!!!", "" ; "only punctuation")]
    #[test_case("file_name.md", "file-name-md" ; "underscore and dot")]
    #[test_case("ﬁle", "file" ; "compatibility ligature")]
    fn test_slugify(input: &str, expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn test_slugify_is_idempotent_on_samples() {
        for input in ["Hello World", "--x--", "Ça va?", "A/B/C", "", "123 456"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn test_slugify_path() {
        assert_eq!(slugify_path("Bookmarks Bar/Dev"), "bookmarks-bar/dev");
        assert_eq!(slugify_path("a//b"), "a/b");
        assert_eq!(slugify_path("/leading/trailing/"), "leading/trailing");
        assert_eq!(slugify_path(".."), DEFAULT_CATEGORY);
        assert_eq!(slugify_path(""), DEFAULT_CATEGORY);
        assert_eq!(slugify_path("pocket"), "pocket");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("what?*"), "what__");

        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_TITLE_CHARS);
    }
}
