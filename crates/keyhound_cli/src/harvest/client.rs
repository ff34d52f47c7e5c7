//! Code-search API client.

use std::time::Duration;

use keyhound_providers::BoxFuture;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Accept header requesting text-match fragments alongside search results.
const TEXT_MATCH_MEDIA_TYPE: &str = "application/vnd.github.text-match+json";

/// Fallback backoff when a rate-limit response carries no `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Errors surfaced while harvesting search results.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// The HTTP client could not be constructed.
    #[error("failed to initialise search client: {0}")]
    ClientInit(String),

    /// A search request failed at the transport level.
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The search API returned an unexpected status code.
    #[error("search returned HTTP {status} for '{query}' page {page}")]
    Status {
        /// The HTTP status code received.
        status: u16,
        /// The query being executed.
        query: String,
        /// The page that was requested.
        page: u32,
    },

    /// The API stayed rate-limited after the single permitted retry.
    #[error("rate limit persisted for '{query}' at page {page}; abandoning query")]
    RateLimitExhausted {
        /// The query being executed.
        query: String,
        /// The page that could not be fetched.
        page: u32,
    },
}

/// A single search result: one file in one repository.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Repository slug, e.g. `"acme/backend"`.
    pub repository: String,
    /// File path within the repository.
    pub path: String,
    /// Matched text fragments from the file.
    pub fragments: Vec<String>,
}

impl SearchHit {
    /// Joins the matched fragments into a single classifiable blob.
    #[must_use]
    pub fn content(&self) -> String {
        self.fragments.join("\n")
    }
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// The 1-based page number this page holds.
    pub page: u32,
    /// Total result count reported by the API.
    pub total_count: u64,
    /// The hits on this page.
    pub hits: Vec<SearchHit>,
    /// Whether the API has more pages beyond this one.
    pub has_next: bool,
}

/// Result of a single page fetch: either a page or a rate-limit signal.
#[derive(Debug)]
pub enum PageFetch {
    /// The page was fetched successfully.
    Page(SearchPage),
    /// The API rate-limited the request.
    RateLimited {
        /// Backoff suggested by the API, if any.
        retry_after: Option<Duration>,
    },
}

/// Trait for paginated code-search backends.
///
/// The production implementation is [`CodeSearchClient`]; tests substitute
/// scripted fakes to exercise pagination and rate-limit handling.
pub trait SearchClient: Send + Sync {
    /// Fetches one page of results for `query`.
    fn fetch_page<'a>(
        &'a self,
        query: &'a str,
        page: u32,
        per_page: u32,
    ) -> BoxFuture<'a, Result<PageFetch, HarvestError>>;
}

/// HTTP client for the GitHub code-search API.
#[derive(Debug, Clone)]
pub struct CodeSearchClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl CodeSearchClient {
    /// Creates a client with the given request timeout and optional API token.
    ///
    /// Unauthenticated search works but is rate-limited far more aggressively.
    pub fn new(timeout: Duration, token: Option<String>) -> Result<Self, HarvestError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("keyhound/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HarvestError::ClientInit(e.to_string()))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
        })
    }

    /// Points the client at a different API root (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn request(&self, query: &str, page: u32, per_page: u32) -> Result<reqwest::Response, HarvestError> {
        let mut request = self
            .http
            .get(format!("{}/search/code", self.base_url))
            .header("accept", TEXT_MATCH_MEDIA_TYPE)
            .query(&[("q", query)])
            .query(&[("page", page), ("per_page", per_page)]);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        Ok(request.send().await?)
    }
}

impl SearchClient for CodeSearchClient {
    fn fetch_page<'a>(
        &'a self,
        query: &'a str,
        page: u32,
        per_page: u32,
    ) -> BoxFuture<'a, Result<PageFetch, HarvestError>> {
        Box::pin(async move {
            let response = self.request(query, page, per_page).await?;

            if is_rate_limited(&response) {
                return Ok(PageFetch::RateLimited {
                    retry_after: retry_after(&response),
                });
            }

            let status = response.status();
            if !status.is_success() {
                return Err(HarvestError::Status {
                    status: status.as_u16(),
                    query: query.to_string(),
                    page,
                });
            }

            let body: SearchResponse = response.json().await?;
            Ok(PageFetch::Page(build_page(body, page, per_page)))
        })
    }
}

fn is_rate_limited(response: &reqwest::Response) -> bool {
    let status = response.status().as_u16();

    if status == 429 {
        return true;
    }

    // GitHub reports primary rate limits as 403 with a drained quota header.
    status == 403
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0")
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn build_page(body: SearchResponse, page: u32, per_page: u32) -> SearchPage {
    let hits = body
        .items
        .into_iter()
        .map(|item| SearchHit {
            repository: item.repository.full_name,
            path: item.path,
            fragments: item.text_matches.into_iter().map(|m| m.fragment).collect(),
        })
        .collect();

    let has_next = u64::from(page) * u64::from(per_page) < body.total_count;

    SearchPage {
        page,
        total_count: body.total_count,
        hits,
        has_next,
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    path: String,
    repository: RawRepository,
    #[serde(default)]
    text_matches: Vec<RawTextMatch>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct RawTextMatch {
    fragment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_body(total_count: u64, items: Vec<RawItem>) -> SearchResponse {
        SearchResponse { total_count, items }
    }

    #[test]
    fn build_page_reports_next_when_results_remain() {
        let page = build_page(page_body(101, vec![]), 2, 50);
        assert!(page.has_next);
    }

    #[test]
    fn build_page_reports_no_next_on_final_page() {
        let page = build_page(page_body(100, vec![]), 2, 50);
        assert!(!page.has_next);
    }

    #[test]
    fn build_page_reports_no_next_for_empty_results() {
        let page = build_page(page_body(0, vec![]), 1, 50);
        assert!(!page.has_next);
    }

    #[test]
    fn search_hit_content_joins_fragments() {
        let hit = SearchHit {
            repository: "acme/backend".to_string(),
            path: "config.py".to_string(),
            fragments: vec!["line one".to_string(), "line two".to_string()],
        };
        assert_eq!(hit.content(), "line one\nline two");
    }

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CodeSearchClient {
        CodeSearchClient::new(Duration::from_secs(5), Some("test-token".to_string()))
            .unwrap()
            .with_base_url(&server.uri())
    }

    fn result_body(total_count: u64) -> serde_json::Value {
        serde_json::json!({
            "total_count": total_count,
            "items": [{
                "path": "src/config.py",
                "repository": { "full_name": "acme/backend" },
                "text_matches": [{ "fragment": "api_key = sk-..." }]
            }]
        })
    }

    #[tokio::test]
    async fn fetch_page_parses_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/code"))
            .and(query_param("q", "sk-ant-"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(result_body(120)))
            .mount(&server)
            .await;

        let fetch = client_for(&server).fetch_page("sk-ant-", 1, 50).await.unwrap();

        let PageFetch::Page(page) = fetch else {
            panic!("expected a page");
        };
        assert_eq!(page.total_count, 120);
        assert_eq!(page.hits.len(), 1);
        assert_eq!(page.hits[0].repository, "acme/backend");
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn fetch_page_detects_429_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/code"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;

        let fetch = client_for(&server).fetch_page("q", 1, 50).await.unwrap();

        let PageFetch::RateLimited { retry_after } = fetch else {
            panic!("expected rate limit");
        };
        assert_eq!(retry_after, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn fetch_page_detects_403_with_drained_quota() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/code"))
            .respond_with(ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "0"))
            .mount(&server)
            .await;

        let fetch = client_for(&server).fetch_page("q", 1, 50).await.unwrap();

        assert!(matches!(fetch, PageFetch::RateLimited { retry_after: None }));
    }

    #[tokio::test]
    async fn fetch_page_treats_plain_403_as_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/code"))
            .respond_with(ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "28"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_page("q", 1, 50).await;

        assert!(matches!(result, Err(HarvestError::Status { status: 403, .. })));
    }

    #[tokio::test]
    async fn fetch_page_reports_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/code"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_page("bad query", 2, 50).await;

        assert!(matches!(
            result,
            Err(HarvestError::Status {
                status: 422,
                page: 2,
                ..
            })
        ));
    }

    #[test]
    fn search_response_parses_github_shape() {
        let json = r#"{
            "total_count": 2,
            "items": [
                {
                    "path": "src/config.py",
                    "repository": { "full_name": "acme/backend" },
                    "text_matches": [ { "fragment": "api_key = ..." } ]
                },
                {
                    "path": "README.md",
                    "repository": { "full_name": "acme/docs" }
                }
            ]
        }"#;

        let body: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.total_count, 2);
        assert_eq!(body.items.len(), 2);
        assert_eq!(body.items[0].repository.full_name, "acme/backend");
        assert!(body.items[1].text_matches.is_empty());
    }
}
