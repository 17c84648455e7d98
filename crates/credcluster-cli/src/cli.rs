// Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use credcluster_identity::RiskFactorType;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.crowdstrike.com";

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned tables, one per group
    Table,
    /// Pretty-printed JSON document
    Json,
    /// One CSV row per group member
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "credcluster", version)]
#[command(about = "Find groups of identity accounts that share a password")]
pub struct Cli {
    /// API client id
    #[arg(long, env = "CREDCLUSTER_CLIENT_ID")]
    pub client_id: Option<String>,

    /// API client secret
    #[arg(long, env = "CREDCLUSTER_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Pre-issued bearer token; skips the credential exchange
    #[arg(long, env = "CREDCLUSTER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API base URL
    #[arg(long, env = "CREDCLUSTER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Entities requested per page (1-1000)
    #[arg(long, default_value_t = 1000)]
    pub page_size: u32,

    /// Pause between page requests, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Stop after this many pages even if the API reports more
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Risk factor types to filter entities by (repeatable)
    #[arg(long = "risk-factor", value_name = "TYPE", default_value = "DUPLICATE_PASSWORD")]
    pub risk_factors: Vec<RiskFactorType>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// HTTP/HTTPS proxy URL
    #[arg(long, env = "CREDCLUSTER_PROXY")]
    pub proxy: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print the report and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["credcluster", "--token", "t"]).unwrap();
        assert_eq!(cli.page_size, 1000);
        assert_eq!(cli.delay_ms, 1000);
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.risk_factors, vec![RiskFactorType::DuplicatePassword]);
        assert!(cli.max_pages.is_none());
    }

    #[test]
    fn test_repeated_risk_factors() {
        let cli = Cli::try_parse_from([
            "credcluster",
            "--risk-factor",
            "duplicate_password",
            "--risk-factor",
            "WEAK_PASSWORD",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(
            cli.risk_factors,
            vec![RiskFactorType::DuplicatePassword, RiskFactorType::WeakPassword]
        );
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["credcluster", "-v", "-q"]).is_err());
    }
}
