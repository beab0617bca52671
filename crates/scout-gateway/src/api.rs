//! Request and response bodies for the HTTP surface.

use serde::{Deserialize, Serialize};

use scout_ai::{ContributionPlan, IssueAnalysis, ProjectAnalysis};
use scout_github::{Issue, Repository};

fn default_max_issues() -> usize {
    10
}

fn default_experience_level() -> String {
    "beginner".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeIssueRequest {
    pub owner: String,
    pub repo: String,
    pub issue_number: u64,
    #[serde(default)]
    pub user_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeIssueResponse {
    pub issue: Issue,
    pub analysis: IssueAnalysis,
    pub contribution_plan: Option<ContributionPlan>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindBeginnerIssuesRequest {
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub send_notification: bool,
}

#[derive(Debug, Clone, Serialize)]
/// One issue kept by the discovery pipeline, paired with its analysis.
pub struct IssueRecommendation {
    pub issue: Issue,
    pub analysis: IssueAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindBeginnerIssuesResponse {
    pub project: String,
    pub total_issues_found: usize,
    pub recommended_issues: usize,
    pub issues: Vec<IssueRecommendation>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchProjectsRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_experience_level")]
    pub experience_level: String,
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSearchResult {
    pub name: String,
    pub category: String,
    pub repository: Repository,
    pub open_beginner_issues: usize,
    pub analysis: ProjectAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchProjectsResponse {
    pub total_projects_found: usize,
    pub analyzed_projects: usize,
    pub projects: Vec<ProjectSearchResult>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyMonitorRequest {}

#[derive(Debug, Clone, Serialize)]
pub struct DailyMonitorResponse {
    pub monitored_projects: usize,
    pub total_issues_found: usize,
    pub recommendations_found: usize,
    pub timestamp: String,
}
