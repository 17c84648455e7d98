// Run configuration assembled from CLI flags and environment

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use credcluster_http::HttpConfig;
use credcluster_identity::{ApiEndpoints, PaginatorConfig, RiskFactorType, MAX_PAGE_SIZE};

use crate::cli::{Cli, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::progress::ProgressMode;

/// How the run obtains its bearer token
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Token issued out of band
    Token(String),
    /// OAuth2 client-credentials exchange
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"***")
                .finish(),
        }
    }
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credentials: Credentials,
    pub endpoints: ApiEndpoints,
    pub http: HttpConfig,
    pub paginator: PaginatorConfig,
    pub risk_factors: Vec<RiskFactorType>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    /// Colour the rendered report; never set when it goes to a file
    pub report_colors: bool,
    /// Colour status lines written to stderr
    pub status_colors: bool,
    pub progress: ProgressMode,
}

impl RunConfig {
    /// Validate parsed flags into a run configuration
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let credentials = resolve_credentials(cli)?;

        if cli.page_size == 0 || cli.page_size > MAX_PAGE_SIZE {
            return Err(CliError::Config(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, cli.page_size
            )));
        }

        if cli.max_pages == Some(0) {
            return Err(CliError::Config("max pages must be at least 1".to_string()));
        }

        if cli.risk_factors.is_empty() {
            return Err(CliError::Config(
                "at least one risk factor type is required".to_string(),
            ));
        }

        let base_url = url::Url::parse(&cli.base_url)
            .map_err(|e| CliError::Config(format!("invalid base URL '{}': {}", cli.base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CliError::Config(format!(
                "base URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let mut http = HttpConfig::long().with_timeout(Duration::from_secs(cli.timeout_secs));
        if let Some(proxy) = &cli.proxy {
            http = http.with_proxy(proxy.clone());
        }

        let stderr_is_tty = atty::is(atty::Stream::Stderr);

        Ok(Self {
            credentials,
            endpoints: ApiEndpoints::new(cli.base_url.clone()),
            http,
            paginator: PaginatorConfig {
                page_size: cli.page_size,
                request_delay: Duration::from_millis(cli.delay_ms),
                max_pages: cli.max_pages,
            },
            risk_factors: cli.risk_factors.clone(),
            format: cli.format,
            output: cli.output.clone(),
            report_colors: !cli.no_color
                && cli.output.is_none()
                && atty::is(atty::Stream::Stdout),
            status_colors: !cli.no_color && stderr_is_tty,
            progress: ProgressMode::from_flags(cli.quiet, stderr_is_tty),
        })
    }
}

fn resolve_credentials(cli: &Cli) -> CliResult<Credentials> {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(&cli.token) {
        return Ok(Credentials::Token(token));
    }

    match (non_empty(&cli.client_id), non_empty(&cli.client_secret)) {
        (Some(client_id), Some(client_secret)) => Ok(Credentials::ClientCredentials {
            client_id,
            client_secret,
        }),
        (Some(_), None) => Err(CliError::Config(
            "client secret is missing (--client-secret or CREDCLUSTER_CLIENT_SECRET)".to_string(),
        )),
        (None, Some(_)) => Err(CliError::Config(
            "client id is missing (--client-id or CREDCLUSTER_CLIENT_ID)".to_string(),
        )),
        (None, None) => Err(CliError::Config(
            "no credentials: provide --client-id and --client-secret, or --token".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["credcluster"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_client_credentials_config() {
        let cli = parse(&[
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--delay-ms",
            "250",
            "--max-pages",
            "5",
        ]);
        let config = RunConfig::from_cli(&cli).unwrap();

        assert_eq!(
            config.credentials,
            Credentials::ClientCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string()
            }
        );
        assert_eq!(config.paginator.request_delay, Duration::from_millis(250));
        assert_eq!(config.paginator.max_pages, Some(5));
        assert_eq!(config.paginator.page_size, 1000);
    }

    #[test]
    fn test_token_takes_precedence() {
        let cli = parse(&["--token", "tok", "--client-id", "id"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.credentials, Credentials::Token("tok".to_string()));
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let cli = parse(&["--client-id", "id"]);
        let err = RunConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("client secret")));
    }

    #[test]
    fn test_page_size_bounds() {
        let cli = parse(&["--token", "t", "--page-size", "0"]);
        assert!(RunConfig::from_cli(&cli).is_err());

        let cli = parse(&["--token", "t", "--page-size", "1001"]);
        assert!(RunConfig::from_cli(&cli).is_err());

        let cli = parse(&["--token", "t", "--page-size", "50"]);
        assert_eq!(RunConfig::from_cli(&cli).unwrap().paginator.page_size, 50);
    }

    #[test]
    fn test_zero_max_pages_is_rejected() {
        let cli = parse(&["--token", "t", "--max-pages", "0"]);
        assert!(RunConfig::from_cli(&cli).is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let cli = parse(&["--token", "t", "--base-url", "not a url"]);
        assert!(RunConfig::from_cli(&cli).is_err());

        let cli = parse(&["--token", "t", "--base-url", "ftp://example.com"]);
        assert!(RunConfig::from_cli(&cli).is_err());
    }

    #[test]
    fn test_report_file_is_never_colored() {
        let cli = parse(&["--token", "t", "--output", "report.txt"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert!(!config.report_colors);
        assert_eq!(config.output, Some(PathBuf::from("report.txt")));
    }

    #[test]
    fn test_quiet_hides_progress() {
        let cli = parse(&["--token", "t", "--quiet", "--no-color"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.progress, ProgressMode::Hidden);
        assert!(!config.report_colors);
        assert!(!config.status_colors);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::ClientCredentials {
            client_id: "id".to_string(),
            client_secret: "hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
        assert!(!format!("{:?}", Credentials::Token("tok123".into())).contains("tok123"));
    }
}
