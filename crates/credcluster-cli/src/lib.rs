//! credcluster command-line tool
//!
//! Fetches identity risk entities, groups accounts that share a password and
//! renders the groups as a table, JSON or CSV.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod report;
pub mod runner;

pub use cli::{Cli, OutputFormat};
pub use config::{Credentials, RunConfig};
pub use error::{CliError, CliResult};
pub use progress::ProgressMode;
pub use report::{reporter_for, CsvReporter, JsonReporter, Reporter, TableReporter};
pub use runner::{run, run_with, RunSummary};
