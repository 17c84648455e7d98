//! HTTP transport for credcluster
//!
//! A thin, mockable wrapper around reqwest used for the credential exchange
//! and the GraphQL query endpoint.
//!
//! ## Features
//!
//! - **Trait-based design**: Mockable via `HttpClientTrait`
//! - **Configurable**: Timeouts, proxy, user-agent, pooling
//! - **Single-shot requests**: no retry layer; pacing belongs to the caller

pub mod client;
pub mod config;
pub mod error;

pub use client::{shared_client, HttpClient, HttpClientTrait};
pub use config::HttpConfig;
pub use error::{HttpError, Result};

/// Re-export commonly used types
pub use reqwest::StatusCode;
