//! Command-line interface components
//!
//! This module contains CLI-specific code for Derpi Fetcher: argument
//! parsing, the download command handler and the progress spinner.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, DownloadArgs, GlobalArgs};
pub use commands::handle_download;
pub use progress::ProgressDisplay;
