//! The application context: every collaborator a request handler needs,
//! constructed once at startup and passed explicitly. No process globals.

use std::sync::Arc;

use async_trait::async_trait;

use scout_ai::Analyzer;
use scout_core::ProjectCatalog;
use scout_github::{GithubClient, GithubError, Issue, IssueState, Repository};
use scout_lark::{Notifier, Recipient};

/// Issue-tracker seam the orchestration layer depends on. Listing and
/// documentation fetches absorb failures into empty results; only the
/// single-issue detail fetch propagates errors.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn repository_info(&self, owner: &str, repo: &str) -> Result<Repository, GithubError>;

    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        state: IssueState,
        labels: &[String],
    ) -> Vec<Issue>;

    async fn issue_details(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> Result<Issue, GithubError>;

    async fn readme(&self, owner: &str, repo: &str) -> String;

    async fn contributing_guide(&self, owner: &str, repo: &str) -> String;
}

#[async_trait]
impl IssueSource for GithubClient {
    async fn repository_info(&self, owner: &str, repo: &str) -> Result<Repository, GithubError> {
        self.get_repository_info(owner, repo).await
    }

    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        state: IssueState,
        labels: &[String],
    ) -> Vec<Issue> {
        self.get_issues(owner, repo, state, labels).await
    }

    async fn issue_details(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> Result<Issue, GithubError> {
        self.get_issue_details(owner, repo, issue_number).await
    }

    async fn readme(&self, owner: &str, repo: &str) -> String {
        self.get_readme(owner, repo).await
    }

    async fn contributing_guide(&self, owner: &str, repo: &str) -> String {
        self.get_contributing_guide(owner, repo).await
    }
}

#[derive(Debug, Clone)]
/// Fixed delays inserted between successive external calls inside batch
/// loops, purely to stay under third-party rate limits.
pub struct PacingConfig {
    pub search_delay_ms: u64,
    pub monitor_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            search_delay_ms: 1_000,
            monitor_delay_ms: 2_000,
        }
    }
}

/// Collaborators shared by all request handlers.
pub struct AppContext {
    pub issues: Arc<dyn IssueSource>,
    pub analyzer: Analyzer,
    pub notifier: Arc<dyn Notifier>,
    pub catalog: ProjectCatalog,
    /// Configured user to address plan cards and digests to. Digests fall
    /// back to the webhook when no user is configured.
    pub user_recipient: Option<Recipient>,
    pub pacing: PacingConfig,
}
