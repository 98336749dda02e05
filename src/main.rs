//! Derpi Fetcher CLI application
//!
//! Command-line interface for downloading every image matching a Derpibooru
//! search, with concurrent downloads, retries and progress tracking.

use std::process;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use derpi_fetcher::cli::{handle_download, Cli};
use derpi_fetcher::config::AppConfig;
use derpi_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // The config file can set the log level, so it is read before logging starts
    let config_path = AppConfig::locate(cli.global.config.clone())?;
    let config = match &config_path {
        Some(path) => AppConfig::load_from_file(path).await?,
        None => AppConfig::default(),
    };

    init_logging(&cli, &config.logging.level);

    info!("Derpi Fetcher v{} starting", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    handle_download(&cli, config).await
}

/// Initialize logging from the verbosity flags, falling back to the configured level
fn init_logging(cli: &Cli, configured_level: &str) {
    let level = match cli.explicit_log_level() {
        Some(level) => level.to_string(),
        None => configured_level.to_string(),
    };

    let mut filter = EnvFilter::from_default_env();
    let mut rejected = None;
    match format!("derpi_fetcher={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(_) => {
            if let Ok(directive) = "derpi_fetcher=info".parse() {
                filter = filter.add_directive(directive);
            }
            rejected = Some(level);
        }
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if let Some(level) = rejected {
        warn!("Unknown log level {:?}, using info", level);
    }
    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
