//! Command-line argument parsing for Derpi Fetcher
//!
//! This module defines the CLI structure using clap derive macros. Every
//! download option is optional so that unset flags fall through to the
//! configuration file and then to the built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::app::ExistingFilePolicy;

/// Derpi Fetcher - Download Derpibooru search results
#[derive(Parser, Debug)]
#[command(
    name = "derpi_fetcher",
    version,
    about = "Download every image matching a Derpibooru search",
    long_about = "Downloads every image matching a Derpibooru search query into per-artist directories,
with a JSON metadata sidecar next to each image. Pages are fetched in order while a pool of
workers downloads concurrently; failed downloads are retried."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Download options
    #[command(flatten)]
    pub download: DownloadArgs,
}

/// Logging and configuration options
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (trace level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - only warnings and errors
    #[arg(short, long, conflicts_with_all = ["verbose", "very_verbose"])]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for a download run
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Search query, e.g. "artist:someone, safe"
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Search filter ID (defaults to 56027, "Everything")
    #[arg(long, value_name = "ID")]
    pub filter_id: Option<u64>,

    /// Number of concurrent download workers (defaults to 100)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Directory the per-artist directories are created in
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Whether images already on disk count toward the total
    #[arg(long, value_enum, value_name = "POLICY")]
    pub existing: Option<ExistingFilePolicy>,

    /// Disable the interactive progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level requested by a verbosity flag, if any was given
    pub fn explicit_log_level(&self) -> Option<tracing::Level> {
        let flagged = self.global.quiet || self.global.verbose || self.global.very_verbose;
        flagged.then(|| self.log_level())
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::WARN
        } else if self.global.very_verbose {
            tracing::Level::TRACE
        } else if self.global.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

impl DownloadArgs {
    /// Reject values clap cannot check on its own
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("Search query cannot be empty".to_string());
        }

        if self.workers == Some(0) {
            return Err("Number of workers must be greater than 0".to_string());
        }

        Ok(())
    }
}
