//! Import service implementation.
//!
//! Orchestrates format detection, parsing and file creation.

pub mod import;

pub use import::{ImportOptions, ImportService};
