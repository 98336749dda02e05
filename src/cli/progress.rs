//! Terminal progress display for download runs
//!
//! A spinner on stderr showing the running download count. It is only drawn
//! when stderr is an interactive terminal and the display is enabled; in
//! every other case the reporter is a no-op and the log lines carry the
//! progress instead.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::app::ProgressReporter;

/// Spinner tick interval
const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Spinner mirroring the aggregated download count
pub struct ProgressDisplay {
    spinner: Option<ProgressBar>,
    /// Suppresses status lines as well as the spinner
    quiet: bool,
}

impl ProgressDisplay {
    /// Create the display, drawing only on an interactive stderr
    pub fn new(enabled: bool) -> Self {
        let is_terminal = atty::is(atty::Stream::Stderr);
        if !enabled || !is_terminal {
            return Self::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒"]);
        spinner.set_style(style);
        spinner.set_message("Downloaded 0 images");
        spinner.enable_steady_tick(TICK_INTERVAL);

        Self {
            spinner: Some(spinner),
            quiet: false,
        }
    }

    /// A display that never draws the spinner but still prints status lines
    pub fn hidden() -> Self {
        Self {
            spinner: None,
            quiet: false,
        }
    }

    /// A display that prints nothing at all
    pub fn silent() -> Self {
        Self {
            spinner: None,
            quiet: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.spinner.is_some()
    }

    /// Whether [`ProgressDisplay::println`] writes anything
    pub fn prints_status(&self) -> bool {
        !self.quiet
    }

    /// Print a line without tearing the spinner
    pub fn println(&self, line: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match &self.spinner {
            Some(spinner) => spinner.println(line.as_ref()),
            None => eprintln!("{}", line.as_ref()),
        }
    }
}

impl ProgressReporter for ProgressDisplay {
    fn downloaded(&self, count: u64) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!("Downloaded {} images", count));
        }
    }

    fn finished(&self, _count: u64) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}
