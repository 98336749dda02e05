//! Command handlers for Derpi Fetcher CLI
//!
//! This module turns parsed arguments and the loaded configuration into one
//! coordinated download run.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::{cancel_on_shutdown_signal, Coordinator, SearchClient, SearchQuery, Storage};
use crate::cli::{Cli, DownloadArgs, ProgressDisplay};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Handle a download run
///
/// Applies the command-line overrides on top of `config`, runs the search
/// and the download pool until the search is exhausted (or stops), and
/// prints a summary. A search that stopped on an error fails the command
/// after the downloads already queued have finished.
pub async fn handle_download(cli: &Cli, config: AppConfig) -> Result<()> {
    let args = &cli.download;
    args.validate().map_err(AppError::generic)?;

    let config = apply_overrides(config, args);
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    let (client_config, coordinator_config) = config.to_runtime_config();
    let client = Arc::new(SearchClient::with_config(&client_config)?);
    let storage = Arc::new(Storage::new(config.output.root.clone()));

    let query = SearchQuery::new(args.query.trim())
        .with_filter_id(config.search.filter_id)
        .with_page_size(config.search.page_size);

    let display = Arc::new(display_for(cli));
    display.println(format!("Searching for \"{}\"...", query.text));
    info!(
        "Writing to {} with {} workers",
        storage.root().display(),
        coordinator_config.worker.worker_count
    );

    let cancel = CancellationToken::new();
    let signal_task = cancel_on_shutdown_signal(cancel.clone());

    let coordinator =
        Coordinator::new(coordinator_config, client, storage).with_reporter(display.clone());
    let outcome = coordinator.run(query, cancel.clone()).await;

    // Release the signal listener whether or not the run succeeded
    cancel.cancel();
    if let Err(e) = signal_task.await {
        debug!("Signal listener ended abnormally: {}", e);
    }

    let result = outcome?;
    display.println(result.summary_line());

    if result.pool.sidecar_failures > 0 {
        warn!(
            "{} metadata files could not be written",
            result.pool.sidecar_failures
        );
    }

    if result.search_failed() {
        return Err(AppError::generic(format!(
            "Search stopped early: {}",
            result.source.end
        )));
    }

    Ok(())
}

/// Spinner and status output matching the verbosity flags
fn display_for(cli: &Cli) -> ProgressDisplay {
    if cli.global.quiet {
        ProgressDisplay::silent()
    } else {
        ProgressDisplay::new(!cli.download.no_progress)
    }
}

/// Layer command-line flags over the loaded configuration
fn apply_overrides(mut config: AppConfig, args: &DownloadArgs) -> AppConfig {
    if let Some(filter_id) = args.filter_id {
        config.search.filter_id = filter_id;
    }
    if let Some(workers) = args.workers {
        config.coordinator.worker.worker_count = workers;
    }
    if let Some(root) = &args.output_dir {
        config.output.root = root.clone();
    }
    if let Some(policy) = args.existing {
        config.coordinator.worker.existing_files = policy;
    }
    config
}
