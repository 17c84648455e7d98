//! Credential exchange

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use credcluster_http::HttpClientTrait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{IdentityError, Result};

/// Short-lived bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Produces a bearer credential or fails the run
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<BearerToken>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// OAuth2 client-credentials exchange against the token endpoint
pub struct ClientCredentialsAuthenticator {
    http: Arc<dyn HttpClientTrait>,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsAuthenticator {
    pub fn new(
        http: Arc<dyn HttpClientTrait>,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

#[async_trait]
impl Authenticator for ClientCredentialsAuthenticator {
    async fn authenticate(&self) -> Result<BearerToken> {
        debug!("Requesting bearer token from {}", self.token_url);

        let reply = self
            .http
            .post_form(
                &self.token_url,
                &[
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                ],
            )
            .await
            .map_err(|e| IdentityError::authentication(e.to_string()))?;

        let response: TokenResponse = serde_json::from_value(reply)
            .map_err(|e| IdentityError::authentication(format!("unreadable token response: {e}")))?;

        let token = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| IdentityError::authentication("token response has no access_token"))?;

        info!(
            expires_in = response.expires_in.unwrap_or_default(),
            "Obtained bearer token"
        );
        Ok(BearerToken::new(token))
    }
}

/// Hands out a token issued elsewhere
pub struct StaticTokenAuthenticator {
    token: BearerToken,
}

impl StaticTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: BearerToken::new(token),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self) -> Result<BearerToken> {
        if self.token.secret().is_empty() {
            return Err(IdentityError::authentication("empty bearer token"));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let token = BearerToken::new("very-secret");
        assert_eq!(format!("{token:?}"), "BearerToken(***)");
        assert_eq!(token.secret(), "very-secret");
    }

    #[tokio::test]
    async fn test_static_authenticator() {
        let token = StaticTokenAuthenticator::new("abc").authenticate().await.unwrap();
        assert_eq!(token.secret(), "abc");

        let err = StaticTokenAuthenticator::new("").authenticate().await.unwrap_err();
        assert!(err.is_authentication());
    }
}
