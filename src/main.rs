//! Binary entry point for markstash.
//!
//! This binary provides the CLI interface for the bookmark collection.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use markstash::config::MarkstashConfig;
use markstash::io::detect_file_format;
use markstash::observability::{self, LoggingConfig};
use markstash::{
    AddRequest, BookmarkService, BookmarkWriter, HttpProbe, ImportService, SearchResult,
    SearchService,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Markstash - bookmarks kept as plain Markdown files.
#[derive(Parser)]
#[command(name = "markstash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bookmark root directory (overrides config and `BOOKMARKS_DIR`).
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Import bookmarks from an export file.
    Import {
        /// File to import.
        file: PathBuf,

        /// Input format: html, json, csv, or pocket (detected when omitted).
        #[arg(short, long)]
        format: Option<String>,

        /// Parse and validate without writing files.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the detected format of a file.
    Detect {
        /// File to inspect.
        file: PathBuf,
    },

    /// Search bookmarks.
    Search {
        /// Text to look for (at least 3 characters).
        query: String,

        /// Maximum number of results.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a single bookmark for a URL or local file.
    Add {
        /// URL, local path, or file:// URI.
        uri: String,

        /// Title (looked up when omitted).
        #[arg(short, long)]
        title: Option<String>,

        /// Category path, such as `dev/rust`.
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Comma-separated tags.
        #[arg(short = 'T', long)]
        tags: Option<String>,

        /// File name to use instead of the title.
        #[arg(long)]
        name: Option<String>,

        /// Replace an existing file with the same name.
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved configuration.
    Config,
}

/// Main entry point.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(LoggingConfig::from_settings(&config.logging, cli.verbose))
    {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<MarkstashConfig, Box<dyn std::error::Error>> {
    let config = MarkstashConfig::load(cli.config.as_deref())?;
    Ok(match &cli.dir {
        Some(dir) => config.with_bookmarks_dir(dir),
        None => config,
    })
}

/// Runs the selected command.
fn run_command(
    command: Commands,
    config: &MarkstashConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Import {
            file,
            format,
            dry_run,
        } => cmd_import(config, file, format, dry_run),

        Commands::Detect { file } => cmd_detect(file),

        Commands::Search { query, limit, json } => cmd_search(config, &query, limit, json),

        Commands::Add {
            uri,
            title,
            category,
            tags,
            name,
            force,
        } => {
            let mut request = AddRequest::new(uri).with_force(force);
            if let Some(title) = title {
                request = request.with_title(title);
            }
            if let Some(category) = category {
                request = request.with_category(category);
            }
            if let Some(tags) = tags {
                request = request.with_tags(tags);
            }
            if let Some(name) = name {
                request = request.with_name(name);
            }
            cmd_add(config, &request)
        },

        Commands::Config => cmd_config(config),
    }
}

/// Import command.
fn cmd_import(
    config: &MarkstashConfig,
    file: PathBuf,
    format: Option<String>,
    dry_run: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let service = ImportService::new(BookmarkWriter::new(&config.bookmarks_dir))
        .with_max_import_size(config.max_import_size);
    let result = service.import_file_with(&file, format.as_deref(), dry_run);

    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.has_errors() && !result.has_imports() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Detect command.
fn cmd_detect(file: PathBuf) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match detect_file_format(&file)? {
        Some(format) => {
            println!("{format}");
            Ok(ExitCode::SUCCESS)
        },
        None => {
            eprintln!("Could not detect the format of {}", file.display());
            Ok(ExitCode::FAILURE)
        },
    }
}

/// Search command.
fn cmd_search(
    config: &MarkstashConfig,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let service = SearchService::new(&config.bookmarks_dir);
    let limit = limit.unwrap_or(config.search_limit);

    if json {
        println!("{}", service.suggest(query, limit)?);
        return Ok(ExitCode::SUCCESS);
    }

    let results = service.search(query, limit);
    if results.is_empty() {
        println!("No bookmarks found.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Found {} bookmarks:", results.len());
    println!();
    for hit in &results {
        print_hit(hit);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_hit(hit: &SearchResult) {
    println!("  {} [{}]", hit.title, hit.category);
    println!("       {}", hit.url);
    if !hit.tags.is_empty() {
        println!("       tags: {}", hit.tags.join(", "));
    }
    println!();
}

/// Add command.
fn cmd_add(
    config: &MarkstashConfig,
    request: &AddRequest,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let probe = HttpProbe::new(config.http_timeout(), &config.http.user_agent)?;
    let service = BookmarkService::new(BookmarkWriter::new(&config.bookmarks_dir), Box::new(probe));

    let written = service.add(request)?;
    println!("{}", serde_json::to_string_pretty(&written)?);

    Ok(ExitCode::SUCCESS)
}

/// Config command.
fn cmd_config(config: &MarkstashConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}
