//! Web search clients: Brave Search API and an offline stub.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use switchboard_core::config::schema::WebSearchConfig;
use switchboard_core::error::{Collaborator, CollaboratorError, CollaboratorResult};

/// User-Agent header.
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7_2) AppleWebKit/537.36 (KHTML, like Gecko)";

const DEFAULT_API_BASE: &str = "https://api.search.brave.com/res/v1";

/// Brave accepts 1..=20 results per request.
const MAX_RESULTS_CAP: usize = 20;

/// Returned when the search API has nothing for the query.
pub const NO_RESULTS: &str = "No results found.";

/// Turns a search query into a results string.
#[async_trait]
pub trait WebSearchClient: Send + Sync {
    async fn search(&self, query: &str) -> CollaboratorResult<String>;
}

fn unavailable(reason: impl Into<String>) -> CollaboratorError {
    CollaboratorError::unavailable(Collaborator::WebSearch, reason)
}

// ─────────────────────────────────────────────
// BraveSearchClient
// ─────────────────────────────────────────────

/// Searches the web using the Brave Search API.
pub struct BraveSearchClient {
    api_key: Option<String>,
    api_base: String,
    max_results: usize,
    client: Client,
}

impl BraveSearchClient {
    /// Create a client from the `tools.web.search` config section.
    ///
    /// A missing API key falls back to the `BRAVE_API_KEY` env var at search time.
    pub fn new(config: &WebSearchConfig) -> Self {
        let api_key = Some(config.api_key.clone()).filter(|k| !k.is_empty());
        Self {
            api_key,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            max_results: (config.max_results as usize).clamp(1, MAX_RESULTS_CAP),
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("BRAVE_API_KEY").ok().filter(|k| !k.is_empty()))
    }

    fn search_url(&self) -> String {
        format!("{}/web/search", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl WebSearchClient for BraveSearchClient {
    async fn search(&self, query: &str) -> CollaboratorResult<String> {
        let api_key = self
            .resolve_api_key()
            .ok_or_else(|| unavailable("no Brave API key configured (set BRAVE_API_KEY env var)"))?;

        debug!(query = %query, count = self.max_results, "searching web");

        let count = self.max_results.to_string();
        let resp = self
            .client
            .get(self.search_url())
            .header("X-Subscription-Token", &api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Brave API request failed");
                unavailable(format!("Brave API request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Brave API error");
            return Err(unavailable(format!("Brave API returned {status}: {body}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("failed to parse Brave response: {e}")))?;

        Ok(format_results(&body))
    }
}

/// Render `web.results` as a numbered list of title, URL and description.
fn format_results(body: &Value) -> String {
    let results = body["web"]["results"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    if results.is_empty() {
        return NO_RESULTS.into();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let title = r["title"].as_str().unwrap_or("(no title)");
            let url = r["url"].as_str().unwrap_or("");
            let desc = r["description"].as_str().unwrap_or("");
            format!("{}. {}\n   {}\n   {}", i + 1, title, url, desc)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ─────────────────────────────────────────────
// StubSearchClient
// ─────────────────────────────────────────────

/// Offline search client that names the query it was given.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubSearchClient;

impl StubSearchClient {
    pub fn results_for(query: &str) -> String {
        format!("Web search results for '{query}'")
    }
}

#[async_trait]
impl WebSearchClient for StubSearchClient {
    async fn search(&self, query: &str) -> CollaboratorResult<String> {
        Ok(Self::results_for(query))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
