//! Integration tests for markstash.
//!
//! These drive the public API end to end: import files into a temporary
//! bookmark tree, then search it.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::too_many_lines)]

use markstash::io::detect_file_format;
use markstash::{
    BookmarkRecord, BookmarkWriter, Error, Format, ImportOptions, ImportService, ImportedEntry,
    SearchService, detect_format,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NETSCAPE_EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3 ADD_DATE="1600000000">A</H3>
    <DL><p>
        <DT><H3>B</H3>
        <DL><p>
            <DT><A HREF="https://first.example/" ADD_DATE="1600000001" TAGS="one,two">First</A>
        </DL><p>
        <DT><A HREF="https://second.example/">Second</A>
    </DL><p>
    <DT><A HREF="https://third.example/">Third</A>
</DL><p>
"#;

const POCKET_EXPORT: &str = r#"{
  "status": 1,
  "list": {
    "229279689": {
      "item_id": "229279689",
      "given_url": "http://www.example.com/given",
      "resolved_url": "https://www.example.com/resolved",
      "given_title": "Given title",
      "resolved_title": "Resolved title",
      "time_added": "1245626956",
      "tags": {"x": {"item_id": "229279689", "tag": "x"}, "y": {"item_id": "229279689", "tag": "y"}}
    },
    "229279690": {
      "item_id": "229279690",
      "given_url": "https://given-only.example/page",
      "given_title": "Given only"
    }
  }
}"#;

const JSON_EXPORT: &str = r#"[
  {"title": "Rust", "url": "https://www.rust-lang.org", "tags": "lang,systems"},
  {"name": "Crates", "link": "https://crates.io", "folder": "Dev Tools/Registries"}
]"#;

const CSV_EXPORT: &str = "title,url\nDocs,https://docs.rs\nBlog,https://blog.rust-lang.org\n";

fn fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn bookmark_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

#[test]
fn test_error_types() {
    let err = Error::InvalidInput("test message".to_string());
    let display = format!("{err}");
    assert!(display.contains("invalid input"));
    assert!(display.contains("test message"));

    let err = Error::OperationFailed {
        operation: "write_bookmark".to_string(),
        cause: "disk full".to_string(),
    };
    let display = format!("{err}");
    assert!(display.contains("write_bookmark"));
    assert!(display.contains("disk full"));
}

#[test]
fn test_detects_canonical_fixtures() {
    assert_eq!(detect_format(NETSCAPE_EXPORT.as_bytes()), Some(Format::Html));
    assert_eq!(detect_format(POCKET_EXPORT.as_bytes()), Some(Format::Pocket));
    assert_eq!(detect_format(JSON_EXPORT.as_bytes()), Some(Format::Json));
    assert_eq!(detect_format(CSV_EXPORT.as_bytes()), Some(Format::Csv));
    assert_eq!(detect_format(b"just some words"), None);
}

#[test]
fn test_detects_from_file() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "export.html", NETSCAPE_EXPORT);
    assert_eq!(detect_file_format(&path).unwrap(), Some(Format::Html));
    assert!(detect_file_format(&dir.path().join("missing.html")).is_err());
}

#[test]
fn test_html_import_follows_folder_nesting() {
    let input = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let path = fixture(&input, "bookmarks.html", NETSCAPE_EXPORT);

    let service = ImportService::new(BookmarkWriter::new(root.path()));
    let result = service.import_file(&path, &ImportOptions::default());

    assert_eq!(result.total, 3);
    assert_eq!(result.success, 3);
    assert_eq!(result.failed, 0);
    assert_eq!(
        bookmark_files(root.path()),
        vec![
            PathBuf::from("a/b/first.md"),
            PathBuf::from("a/second.md"),
            PathBuf::from("unsorted/third.md"),
        ]
    );

    let first = std::fs::read_to_string(root.path().join("a/b/first.md")).unwrap();
    assert!(first.starts_with("---\ntitle: First\nuri: https://first.example/\n"));
    assert!(first.contains("tags: [a/b,one,two]"));
    assert!(first.contains("add_date: 1600000001"));
    assert!(first.ends_with("[First](https://first.example/)\n"));
}

#[test]
fn test_import_then_search() {
    let input = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let service = ImportService::new(BookmarkWriter::new(root.path()));

    for (name, content) in [
        ("bookmarks.html", NETSCAPE_EXPORT),
        ("pocket.json", POCKET_EXPORT),
        ("plain.json", JSON_EXPORT),
        ("plain.csv", CSV_EXPORT),
    ] {
        let result = service.import_file(&fixture(&input, name, content), &ImportOptions::default());
        assert_eq!(result.failed, 0, "{name}: {:?}", result.errors);
        assert!(result.has_imports(), "{name}");
    }

    let search = SearchService::new(root.path());

    let hits = search.search("resolved title", 20);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "https://www.example.com/resolved");
    assert_eq!(hits[0].category, "pocket");
    assert!(hits[0].tags.contains(&"x".to_string()));
    assert!(hits[0].tags.contains(&"y".to_string()));

    let hits = search.search("crates.io", 20);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Crates");
    assert_eq!(hits[0].category, "registries");

    let hits = search.search("docs.rs", 20);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].category, "unsorted");

    // Every imported file carries its category as a tag
    assert_eq!(search.search("unsorted", 20).len(), 4);
    assert_eq!(search.search("unsorted", 2).len(), 2);
}

#[test]
fn test_round_trip_of_single_bookmark() {
    let root = TempDir::new().unwrap();
    BookmarkWriter::new(root.path())
        .write(&BookmarkRecord::new("Test", "https://example.com").with_category("test"))
        .unwrap();

    let search = SearchService::new(root.path());
    for query in ["test", "example.com"] {
        let hits = search.search(query, 20);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "test");
        assert!(hits[0].tags.contains(&"test".to_string()));
    }
    assert!(search.search("te", 20).is_empty());
}

#[test]
fn test_reimport_adds_timestamp_suffix() {
    let input = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let path = fixture(&input, "plain.csv", "title,url\nDocs,https://docs.rs\n");
    let service = ImportService::new(BookmarkWriter::new(root.path()));

    assert_eq!(service.import_file(&path, &ImportOptions::default()).success, 1);
    assert_eq!(service.import_file(&path, &ImportOptions::default()).success, 1);

    let files = bookmark_files(&root.path().join("unsorted"));
    assert_eq!(files.len(), 2);
    assert_eq!(files[0], PathBuf::from("docs.md"));
    let suffixed = files[1].to_string_lossy().into_owned();
    assert!(suffixed.starts_with("docs_"), "{suffixed}");
    assert_eq!(suffixed.len(), "docs_YYYYMMDD_HHMMSS.md".len());
}

#[test]
fn test_dry_run_writes_nothing() {
    let input = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let service = ImportService::new(BookmarkWriter::new(root.path()));
    let options = ImportOptions::default().with_dry_run(true);

    for (name, content) in [
        ("bookmarks.html", NETSCAPE_EXPORT),
        ("pocket.json", POCKET_EXPORT),
        ("plain.json", JSON_EXPORT),
        ("plain.csv", CSV_EXPORT),
    ] {
        let result = service.import_file(&fixture(&input, name, content), &options);
        assert_eq!(result.success, result.total, "{name}");
        assert!(
            result
                .imported
                .iter()
                .all(|entry| matches!(entry, ImportedEntry::Record(_))),
            "{name}"
        );
    }

    assert!(bookmark_files(root.path()).is_empty());
}

#[test]
fn test_missing_file_and_bad_format_fail_fast() {
    let root = TempDir::new().unwrap();
    let service = ImportService::new(BookmarkWriter::new(root.path()));

    let result = service.import_file(&root.path().join("nope.html"), &ImportOptions::default());
    assert_eq!((result.total, result.success, result.failed), (0, 0, 1));
    assert!(result.errors[0].error.starts_with("File not found"));

    let input = TempDir::new().unwrap();
    let path = fixture(&input, "plain.csv", CSV_EXPORT);
    let result = service.import_file_with(&path, Some("xml"), false);
    assert_eq!((result.total, result.success, result.failed), (0, 0, 1));
    assert_eq!(result.errors[0].error, "Unsupported format: xml");

    let path = fixture(&input, "notes.txt", "nothing to see here");
    let result = service.import_file(&path, &ImportOptions::default());
    assert_eq!((result.total, result.failed), (0, 1));
    assert!(bookmark_files(root.path()).is_empty());
}

#[test]
fn test_partial_failures_do_not_abort_batch() {
    let input = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let path = fixture(
        &input,
        "mixed.json",
        r#"{"items": [
            {"title": "Good", "url": "https://good.example"},
            {"title": "No link"},
            42,
            {"title": "Also good", "uri": "https://also.example"}
        ]}"#,
    );

    let service = ImportService::new(BookmarkWriter::new(root.path()));
    let result = service.import_file(&path, &ImportOptions::default());

    assert_eq!(result.total, 4);
    assert_eq!(result.success, 2);
    assert_eq!(result.failed, 2);
    assert_eq!(result.success + result.failed, result.total);
    assert_eq!(bookmark_files(root.path()).len(), 2);
}

#[test]
fn test_size_limit_is_enforced() {
    let input = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let path = fixture(&input, "plain.csv", CSV_EXPORT);

    let service = ImportService::new(BookmarkWriter::new(root.path())).with_max_import_size(16);
    let result = service.import_file(&path, &ImportOptions::default());

    assert_eq!((result.total, result.failed), (0, 1));
    assert!(bookmark_files(root.path()).is_empty());
}
