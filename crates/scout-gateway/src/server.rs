//! Router assembly and the thin axum handlers over the orchestrator.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use crate::api::{
    AnalyzeIssueRequest, DailyMonitorRequest, FindBeginnerIssuesRequest, SearchProjectsRequest,
};
use crate::context::AppContext;
use crate::orchestrator;

const HEALTH_ENDPOINT: &str = "/";
const ANALYZE_ISSUE_ENDPOINT: &str = "/api/analyze-issue";
const FIND_BEGINNER_ISSUES_ENDPOINT: &str = "/api/find-beginner-issues";
const SEARCH_PROJECTS_ENDPOINT: &str = "/api/search-bigdata-projects";
const DAILY_MONITOR_ENDPOINT: &str = "/api/daily-monitor";

struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request pipeline failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": self.0.to_string()})),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        Self(error)
    }
}

pub fn build_router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route(HEALTH_ENDPOINT, get(handle_health))
        .route(ANALYZE_ISSUE_ENDPOINT, post(handle_analyze_issue))
        .route(
            FIND_BEGINNER_ISSUES_ENDPOINT,
            post(handle_find_beginner_issues),
        )
        .route(SEARCH_PROJECTS_ENDPOINT, post(handle_search_projects))
        .route(DAILY_MONITOR_ENDPOINT, post(handle_daily_monitor))
        .with_state(context)
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "scout",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn handle_analyze_issue(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<AnalyzeIssueRequest>,
) -> Result<Response, ApiError> {
    let response = orchestrator::analyze_issue(&context, request).await?;
    Ok(Json(response).into_response())
}

async fn handle_find_beginner_issues(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<FindBeginnerIssuesRequest>,
) -> Result<Response, ApiError> {
    let response = orchestrator::find_beginner_issues(&context, request).await?;
    Ok(Json(response).into_response())
}

async fn handle_search_projects(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<SearchProjectsRequest>,
) -> Result<Response, ApiError> {
    let response = orchestrator::search_projects(&context, request).await?;
    Ok(Json(response).into_response())
}

async fn handle_daily_monitor(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<DailyMonitorRequest>,
) -> Result<Response, ApiError> {
    let response = orchestrator::daily_monitor(&context, request).await?;
    Ok(Json(response).into_response())
}
