// CLI error types

use credcluster_http::HttpError;
use credcluster_identity::IdentityError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(#[source] IdentityError),

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render report: {0}")]
    Render(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nRun 'credcluster --help' for the available options.",
                    msg
                )
            }
            CliError::Authentication(e) => {
                format!(
                    "Could not obtain an API token: {}\n\nCheck the client id and secret, and that the API base URL matches your cloud region.",
                    e
                )
            }
            CliError::Http(e) => format!("HTTP client setup failed: {}", e),
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Render(msg) => format!("Failed to render report: {}", msg),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_) => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_with_usage_code() {
        let err = CliError::Config("page size must be positive".to_string());
        assert_eq!(err.exit_code(), 2);
        assert!(err.user_message().contains("--help"));
    }

    #[test]
    fn test_authentication_message_mentions_credentials() {
        let err = CliError::Authentication(IdentityError::authentication("HTTP 401"));
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_message().contains("client id and secret"));
    }
}
