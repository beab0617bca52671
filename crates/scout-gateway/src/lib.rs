//! HTTP surface and request orchestration: four POST pipelines plus a
//! health endpoint, all running against an explicit application context.

mod api;
mod context;
mod orchestrator;
mod server;

pub use api::{
    AnalyzeIssueRequest, AnalyzeIssueResponse, DailyMonitorRequest, DailyMonitorResponse,
    FindBeginnerIssuesRequest, FindBeginnerIssuesResponse, IssueRecommendation,
    ProjectSearchResult, SearchProjectsRequest, SearchProjectsResponse,
};
pub use context::{AppContext, IssueSource, PacingConfig};
pub use orchestrator::{
    analyze_issue, daily_monitor, find_beginner_issues, search_projects,
};
pub use server::build_router;
