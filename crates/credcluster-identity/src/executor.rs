//! Query execution against the GraphQL endpoint

use std::sync::Arc;

use async_trait::async_trait;
use credcluster_http::HttpClientTrait;
use tracing::debug;

use crate::auth::BearerToken;
use crate::error::Result;
use crate::query::{EntityPage, EntityQueryVariables};

/// Token endpoint path relative to the API base URL
pub const TOKEN_PATH: &str = "/oauth2/token";

/// GraphQL endpoint path relative to the API base URL
pub const GRAPHQL_PATH: &str = "/identity-protection/combined/graphql/v1";

/// Resolved API endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base_url: String,
}

impl ApiEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, TOKEN_PATH)
    }

    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.base_url, GRAPHQL_PATH)
    }
}

/// Runs one page of the entities query
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, variables: &EntityQueryVariables) -> Result<EntityPage>;
}

/// Authenticated executor posting to the GraphQL endpoint
pub struct GraphqlExecutor {
    http: Arc<dyn HttpClientTrait>,
    endpoint: String,
    token: BearerToken,
}

impl GraphqlExecutor {
    pub fn new(http: Arc<dyn HttpClientTrait>, endpoint: impl Into<String>, token: BearerToken) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token,
        }
    }
}

#[async_trait]
impl QueryExecutor for GraphqlExecutor {
    async fn execute(&self, variables: &EntityQueryVariables) -> Result<EntityPage> {
        debug!(
            first = variables.first,
            after = variables.after.as_deref().unwrap_or("<start>"),
            "Executing entities query"
        );
        let body = variables.to_request_body()?;
        let response = self
            .http
            .post_json(&self.endpoint, Some(self.token.secret()), &body)
            .await?;
        EntityPage::from_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_strip_trailing_slash() {
        let endpoints = ApiEndpoints::new("https://api.example.com/");
        assert_eq!(endpoints.base_url(), "https://api.example.com");
        assert_eq!(endpoints.token_url(), "https://api.example.com/oauth2/token");
        assert_eq!(
            endpoints.graphql_url(),
            "https://api.example.com/identity-protection/combined/graphql/v1"
        );
    }
}
