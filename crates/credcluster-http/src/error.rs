//! HTTP transport error types

use thiserror::Error;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// HTTP transport errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network request failed
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid proxy configuration
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

impl HttpError {
    /// Status code carried by the error, if the server answered at all
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            HttpError::HttpStatus { status, .. } => Some(*status),
            HttpError::RequestFailed(e) => e.status(),
            _ => None,
        }
    }

    /// True for 401/403 responses, i.e. a credential or scope problem
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self.status(),
            Some(reqwest::StatusCode::UNAUTHORIZED) | Some(reqwest::StatusCode::FORBIDDEN)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_statuses() {
        let forbidden = HttpError::HttpStatus {
            status: reqwest::StatusCode::FORBIDDEN,
            message: "insufficient scope".to_string(),
        };
        let unauthorized = HttpError::HttpStatus {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: String::new(),
        };
        assert!(forbidden.is_permission_denied());
        assert!(unauthorized.is_permission_denied());
    }

    #[test]
    fn test_other_errors_are_not_permission_problems() {
        let server = HttpError::HttpStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        };
        assert!(!server.is_permission_denied());
        assert!(!HttpError::InvalidUrl("nope".to_string()).is_permission_denied());
        assert_eq!(HttpError::Decode("x".to_string()).status(), None);
    }
}
