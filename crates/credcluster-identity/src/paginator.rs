//! Cursor-driven retrieval of every entity matching a risk-factor filter

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::IdentityError;
use crate::executor::QueryExecutor;
use crate::models::{Entity, RiskFactorType};
use crate::query::{EntityQueryVariables, MAX_PAGE_SIZE};

/// Pagination settings
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatorConfig {
    /// Requested nodes per page
    pub page_size: u32,
    /// Fixed pause between two successive requests
    pub request_delay: Duration,
    /// Optional safety cap on the number of pages; `None` trusts `hasNextPage`
    pub max_pages: Option<usize>,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            request_delay: Duration::from_secs(1),
            max_pages: None,
        }
    }
}

/// Progress report emitted after each fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// 1-based page number
    pub page: usize,
    pub page_entities: usize,
    pub total_entities: usize,
    pub has_next_page: bool,
}

/// A page request that aborted the loop
#[derive(Debug)]
pub struct PageFetchFailure {
    /// 1-based number of the page whose request or response failed
    pub page: usize,
    pub error: IdentityError,
}

impl PageFetchFailure {
    pub fn is_permission_related(&self) -> bool {
        self.error.is_permission_related()
    }
}

/// Why the loop stopped
#[derive(Debug)]
pub enum StopReason {
    /// The server reported no further pages
    Exhausted,
    /// A page request failed; later pages were never requested
    PageFailure(PageFetchFailure),
    /// `max_pages` was reached while the server still reported more pages
    PageLimit { limit: usize },
}

/// Everything accumulated by one pagination run
#[derive(Debug)]
pub struct FetchOutcome {
    /// Entities in page order, then server order within a page
    pub entities: Vec<Entity>,
    /// Number of successfully fetched pages
    pub pages_fetched: usize,
    pub stop: StopReason,
}

impl FetchOutcome {
    /// Only an exhausted cursor yields an authoritative entity list
    pub fn is_complete(&self) -> bool {
        matches!(self.stop, StopReason::Exhausted)
    }

    pub fn failure(&self) -> Option<&PageFetchFailure> {
        match &self.stop {
            StopReason::PageFailure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Drives the entities query page by page
pub struct Paginator {
    executor: Arc<dyn QueryExecutor>,
    config: PaginatorConfig,
}

impl Paginator {
    pub fn new(executor: Arc<dyn QueryExecutor>, config: PaginatorConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// Fetch every page matching `filter`
    pub async fn fetch_all(&self, filter: &[RiskFactorType]) -> FetchOutcome {
        self.fetch_all_with_progress(filter, |_| {}).await
    }

    /// Fetch every page matching `filter`, reporting after each page
    ///
    /// A failed request ends the loop; the entities gathered so far are
    /// returned with the failure recorded in [`FetchOutcome::stop`].
    pub async fn fetch_all_with_progress<F>(
        &self,
        filter: &[RiskFactorType],
        mut on_page: F,
    ) -> FetchOutcome
    where
        F: FnMut(&PageProgress),
    {
        let mut entities: Vec<Entity> = Vec::new();
        let mut variables = EntityQueryVariables::first_page(self.config.page_size, filter.to_vec());
        let mut pages_fetched = 0usize;

        let stop = loop {
            let page = pages_fetched + 1;
            debug!(page, "Requesting entity page");

            let result = match self.executor.execute(&variables).await {
                Ok(result) => result,
                Err(error) => {
                    warn!(
                        page,
                        accumulated = entities.len(),
                        permission_related = error.is_permission_related(),
                        "Entity page request failed, keeping partial results: {}",
                        error
                    );
                    break StopReason::PageFailure(PageFetchFailure { page, error });
                }
            };

            pages_fetched = page;
            let page_entities = result.entities.len();
            entities.extend(result.entities);
            let has_next_page = result.page_info.has_next_page;

            info!(
                page,
                page_entities,
                total = entities.len(),
                has_next_page,
                "Fetched entity page"
            );
            on_page(&PageProgress {
                page,
                page_entities,
                total_entities: entities.len(),
                has_next_page,
            });

            if !has_next_page {
                break StopReason::Exhausted;
            }

            // Without a cursor the next request would repeat the first page
            let Some(cursor) = result.page_info.end_cursor else {
                let error = IdentityError::malformed("hasNextPage is true but endCursor is missing");
                warn!(page, "{}", error);
                break StopReason::PageFailure(PageFetchFailure { page, error });
            };

            if let Some(limit) = self.config.max_pages {
                if pages_fetched >= limit {
                    warn!(limit, "Page limit reached before the last page");
                    break StopReason::PageLimit { limit };
                }
            }

            variables.after = Some(cursor);

            if !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        };

        FetchOutcome {
            entities,
            pages_fetched,
            stop,
        }
    }
}
