//! Identity risk error types

use credcluster_http::HttpError;
use thiserror::Error;

/// Message fragments the API uses when a credential lacks the required scope
const PERMISSION_MARKERS: &[&str] = &[
    "scope",
    "permission",
    "forbidden",
    "unauthorized",
    "access denied",
];

/// Errors that can occur while talking to the identity risk API
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Credential exchange failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport-level failure
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The query endpoint answered with GraphQL errors
    #[error("GraphQL error: {0}")]
    Graphql(String),

    /// The response did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IdentityError {
    /// Create a new authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        IdentityError::Authentication(msg.into())
    }

    /// Create a new malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        IdentityError::MalformedResponse(msg.into())
    }

    /// Check if this is an authentication error
    pub fn is_authentication(&self) -> bool {
        matches!(self, IdentityError::Authentication(_))
    }

    /// Whether the failure most likely comes from missing API scopes
    pub fn is_permission_related(&self) -> bool {
        match self {
            IdentityError::Http(e) => e.is_permission_denied(),
            IdentityError::Graphql(message) => {
                let lowered = message.to_lowercase();
                PERMISSION_MARKERS.iter().any(|m| lowered.contains(m))
            }
            _ => false,
        }
    }
}

/// Result type for identity operations
pub type Result<T> = std::result::Result<T, IdentityError>;
