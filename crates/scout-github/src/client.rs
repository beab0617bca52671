//! HTTP client for the GitHub REST v3 API.

use std::time::Duration;

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

use crate::types::{Issue, IssueState, RawIssue, Repository};

const RATE_LIMIT_WARN_THRESHOLD: u64 = 10;

#[derive(Debug, Error)]
/// Errors surfaced by the GitHub adapter.
pub enum GithubError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("github returned non-success status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone)]
/// Connection settings for `GithubClient`.
pub struct GithubClientConfig {
    pub api_base: String,
    pub token: String,
    pub request_timeout_ms: u64,
    /// Delay inserted between successive listing pages to stay under the
    /// remote call budget.
    pub page_delay_ms: u64,
    pub per_page: usize,
}

impl GithubClientConfig {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            token: token.into(),
            request_timeout_ms: 30_000,
            page_delay_ms: 500,
            per_page: 100,
        }
    }
}

#[derive(Debug, Clone)]
/// Thin adapter over the GitHub REST API.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    page_delay_ms: u64,
    per_page: usize,
}

impl GithubClient {
    pub fn new(config: GithubClientConfig) -> Result<Self, GithubError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("token {}", config.token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth)
                .map_err(|e| GithubError::InvalidConfig(format!("invalid token header: {e}")))?,
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("scout-issue-triage"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            page_delay_ms: config.page_delay_ms,
            per_page: config.per_page.max(1),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, GithubError> {
        let url = format!("{}/{}", self.api_base, endpoint);
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if let Some(remaining) = rate_limit_remaining(response.headers()) {
            if remaining < RATE_LIMIT_WARN_THRESHOLD {
                warn!(remaining, endpoint, "github rate limit almost exhausted");
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GithubError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetches repository metadata.
    pub async fn get_repository_info(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Repository, GithubError> {
        self.get_json(&format!("repos/{owner}/{repo}"), &[]).await
    }

    /// Lists issues matching `state` and `labels`, walking pages until a
    /// short page signals the end.
    ///
    /// Pull requests (which the listing endpoint conflates with issues) are
    /// excluded. A failed page is logged and whatever was accumulated so far
    /// is returned instead of failing the whole call.
    pub async fn get_issues(
        &self,
        owner: &str,
        repo: &str,
        state: IssueState,
        labels: &[String],
    ) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut page = 1usize;

        loop {
            let mut query = vec![
                ("state", state.as_str().to_string()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ];
            if !labels.is_empty() {
                query.push(("labels", labels.join(",")));
            }

            let raw: Vec<RawIssue> = match self
                .get_json(&format!("repos/{owner}/{repo}/issues"), &query)
                .await
            {
                Ok(raw) => raw,
                Err(error) => {
                    warn!(%error, owner, repo, page, "issue listing page failed");
                    break;
                }
            };

            let page_len = raw.len();
            issues.extend(
                raw.into_iter()
                    .filter(|item| !item.is_pull_request())
                    .map(RawIssue::into_issue),
            );

            if page_len < self.per_page {
                break;
            }

            page += 1;
            sleep(Duration::from_millis(self.page_delay_ms)).await;
        }

        issues
    }

    /// Fetches one issue's full detail. Unlike listings, failures here are
    /// propagated to the caller.
    pub async fn get_issue_details(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> Result<Issue, GithubError> {
        let raw: RawIssue = self
            .get_json(&format!("repos/{owner}/{repo}/issues/{issue_number}"), &[])
            .await?;
        Ok(raw.into_issue())
    }

    /// Returns the repository README as text, or an empty string when the
    /// file is absent or undecodable. Callers treat `""` as "no docs".
    pub async fn get_readme(&self, owner: &str, repo: &str) -> String {
        self.get_content_blob(&format!("repos/{owner}/{repo}/readme"))
            .await
    }

    /// Returns CONTRIBUTING.md as text, or an empty string when absent.
    pub async fn get_contributing_guide(&self, owner: &str, repo: &str) -> String {
        self.get_content_blob(&format!("repos/{owner}/{repo}/contents/CONTRIBUTING.md"))
            .await
    }

    async fn get_content_blob(&self, endpoint: &str) -> String {
        let blob: ContentBlob = match self.get_json(endpoint, &[]).await {
            Ok(blob) => blob,
            Err(_) => return String::new(),
        };
        decode_content_blob(&blob.content).unwrap_or_default()
    }

    /// Searches repositories by stars-qualified query, most-starred first.
    pub async fn search_repositories(
        &self,
        query: &str,
        language: Option<&str>,
        stars: &str,
        per_page: usize,
    ) -> Result<Vec<Repository>, GithubError> {
        let mut search_query = format!("{query} stars:{stars}");
        if let Some(language) = language {
            search_query.push_str(&format!(" language:{language}"));
        }

        let result: SearchResult = self
            .get_json(
                "search/repositories",
                &[
                    ("q", search_query),
                    ("sort", "stars".to_string()),
                    ("order", "desc".to_string()),
                    ("per_page", per_page.to_string()),
                ],
            )
            .await?;
        Ok(result.items)
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlob {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    items: Vec<Repository>,
}

fn rate_limit_remaining(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get("x-ratelimit-remaining")?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Decodes a base64 content blob; the API wraps the payload with newlines.
fn decode_content_blob(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|ch| !ch.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()?;
    String::from_utf8(bytes).ok()
}
