//! GitHub REST adapter: issue listings, issue detail, documentation blobs,
//! and repository search.

mod client;
mod types;

pub use client::{GithubClient, GithubClientConfig, GithubError};
pub use types::{Issue, IssueState, Repository};
