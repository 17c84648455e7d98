// Progress indicators and spinners

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// How per-page progress reaches the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Warnings only
    Hidden,
    /// Animated spinner on an interactive stderr
    Spinner,
    /// One status line per page when stderr is piped
    Lines,
}

impl ProgressMode {
    pub fn from_flags(quiet: bool, stderr_is_tty: bool) -> Self {
        match (quiet, stderr_is_tty) {
            (true, _) => ProgressMode::Hidden,
            (false, true) => ProgressMode::Spinner,
            (false, false) => ProgressMode::Lines,
        }
    }
}

/// Create a spinner for long-running operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|e| {
            eprintln!("Failed to create spinner template: {}", e);
            ProgressStyle::default_spinner()
        });
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Per-page status line
pub fn page_message(page: usize, page_entities: usize, total_entities: usize) -> String {
    format!(
        "Fetched page {} ({} entities, {} total)",
        page, page_entities, total_entities
    )
}

/// Final count once pagination stops
pub fn fetched_message(entities: usize, pages: usize) -> String {
    format!("Fetched {} entities across {} page(s)", entities, pages)
}
