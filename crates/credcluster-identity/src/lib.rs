//! Identity risk retrieval for credcluster
//!
//! This crate provides:
//! - Client-credentials authentication against the identity API
//! - The `entities` GraphQL query and its typed response model
//! - A cursor paginator that keeps partial results when a page fails
//! - Grouping of duplicate-password risk factors into shared-password clusters

pub mod aggregator;
pub mod auth;
pub mod error;
pub mod executor;
pub mod models;
pub mod paginator;
pub mod query;

pub use aggregator::{
    aggregate, flatten, group, parse_timestamp, resolve_password_last_set, retain_shared,
    DuplicatePasswordReport, FlatRecord, Group,
};
pub use auth::{Authenticator, BearerToken, ClientCredentialsAuthenticator, StaticTokenAuthenticator};
pub use error::{IdentityError, Result};
pub use executor::{ApiEndpoints, GraphqlExecutor, QueryExecutor};
pub use models::{
    Account, AttackPathStep, Entity, EntityKind, PageInfo, PasswordAttributes, PathEntity,
    RiskFactor, RiskFactorDetail, RiskFactorType, RiskSeverity,
};
pub use paginator::{
    FetchOutcome, PageFetchFailure, PageProgress, Paginator, PaginatorConfig, StopReason,
};
pub use query::{EntityPage, EntityQueryVariables, ENTITY_QUERY, MAX_PAGE_SIZE};
