//! Per-query harvest sessions with pagination and rate-limit backoff.

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

use super::client::{DEFAULT_RETRY_AFTER, HarvestError, PageFetch, SearchClient, SearchPage};

/// Factory for [`HarvestSession`]s sharing one client and one set of limits.
pub struct Harvester {
    client: Arc<dyn SearchClient>,
    max_pages: u32,
    per_page: u32,
    page_delay: Duration,
}

impl std::fmt::Debug for Harvester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harvester")
            .field("max_pages", &self.max_pages)
            .field("per_page", &self.per_page)
            .field("page_delay", &self.page_delay)
            .finish_non_exhaustive()
    }
}

impl Harvester {
    /// Creates a harvester over the given search client.
    pub fn new(client: Arc<dyn SearchClient>, max_pages: u32, per_page: u32, page_delay: Duration) -> Self {
        Self {
            client,
            max_pages,
            per_page,
            page_delay,
        }
    }

    /// Starts a session for one query, beginning at page 1.
    #[must_use]
    pub fn session(&self, query: &str) -> HarvestSession {
        HarvestSession {
            client: Arc::clone(&self.client),
            query: query.to_string(),
            max_pages: self.max_pages,
            per_page: self.per_page,
            page_delay: self.page_delay,
            next_page: 1,
            pages_fetched: 0,
            done: false,
        }
    }
}

/// Walks one query's result pages in order.
///
/// A rate-limited fetch is retried once after the API's suggested backoff
/// (or a fixed fallback). A second consecutive rate limit ends the session
/// with [`HarvestError::RateLimitExhausted`]; the caller abandons the query
/// and moves on.
pub struct HarvestSession {
    client: Arc<dyn SearchClient>,
    query: String,
    max_pages: u32,
    per_page: u32,
    page_delay: Duration,
    next_page: u32,
    pages_fetched: u32,
    done: bool,
}

impl HarvestSession {
    /// The query this session is executing.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Skips ahead so the next fetch requests `page` (used to resume).
    pub fn resume_from(&mut self, page: u32) {
        self.next_page = page.max(1);
    }

    /// Fetches the next page, or `None` once the session is finished.
    ///
    /// The session finishes when the API reports no further pages or when
    /// the page cap is reached, whichever comes first. Pages after the first
    /// are preceded by the configured inter-page delay.
    pub async fn next_page(&mut self) -> Result<Option<SearchPage>, HarvestError> {
        if self.done || self.pages_fetched >= self.max_pages {
            return Ok(None);
        }

        if self.pages_fetched > 0 && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }

        let page = self.fetch_with_retry().await?;

        self.pages_fetched += 1;
        self.next_page += 1;
        if !page.has_next {
            self.done = true;
        }

        Ok(Some(page))
    }

    async fn fetch_with_retry(&mut self) -> Result<SearchPage, HarvestError> {
        match self.client.fetch_page(&self.query, self.next_page, self.per_page).await? {
            PageFetch::Page(page) => Ok(page),
            PageFetch::RateLimited { retry_after } => {
                let backoff = retry_after.unwrap_or(DEFAULT_RETRY_AFTER);

                #[cfg(feature = "tracing")]
                debug!(query = %self.query, page = self.next_page, ?backoff, "rate limited, backing off");

                tokio::time::sleep(backoff).await;

                match self.client.fetch_page(&self.query, self.next_page, self.per_page).await? {
                    PageFetch::Page(page) => Ok(page),
                    PageFetch::RateLimited { .. } => {
                        self.done = true;
                        Err(HarvestError::RateLimitExhausted {
                            query: self.query.clone(),
                            page: self.next_page,
                        })
                    }
                }
            }
        }
    }
}
