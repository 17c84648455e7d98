//! HTTP client implementation

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::{
    config::HttpConfig,
    error::{HttpError, Result},
};

/// Mockable HTTP client trait
///
/// Both calls are sent exactly once. Callers that want pacing or retries
/// layer them on top.
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// POST an `application/x-www-form-urlencoded` body and decode a JSON reply
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Value>;

    /// POST a JSON body, optionally with a bearer credential, and decode a JSON reply
    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &Value) -> Result<Value>;
}

/// Production HTTP client
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(if config.max_redirects > 0 {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            });

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| HttpError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        if config.pool_enabled {
            builder = builder.pool_idle_timeout(config.pool_idle_timeout);
        } else {
            builder = builder.pool_max_idle_per_host(0);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let url = url
            .parse::<url::Url>()
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        Ok(self.inner.request(method, url))
    }

    async fn send_for_json(request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(HttpError::RequestFailed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::HttpStatus {
                status,
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string()),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Value> {
        debug!("HTTP POST (form): {}", url);
        let request = self
            .request(Method::POST, url)?
            .header(reqwest::header::ACCEPT, "application/json")
            .form(fields);
        Self::send_for_json(request).await
    }

    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &Value) -> Result<Value> {
        debug!("HTTP POST (json): {}", url);
        let mut request = self
            .request(Method::POST, url)?
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        Self::send_for_json(request).await
    }
}

/// Create a shared HTTP client (Arc-wrapped for cloning)
pub fn shared_client(config: HttpConfig) -> Result<Arc<dyn HttpClientTrait>> {
    Ok(Arc::new(HttpClient::new(config)?))
}
