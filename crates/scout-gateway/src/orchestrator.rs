//! The four request pipelines. Each is a single sequential flow: per-item
//! failures inside a loop are logged and skipped; only setup-phase failures
//! abort the request.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{info, warn};

use scout_ai::IssueAnalysis;
use scout_core::ExperienceLevel;
use scout_github::{Issue, IssueState};
use scout_lark::{
    build_daily_digest_card, build_issue_card, build_plan_card, DigestProject,
    DigestRecommendation,
};

use crate::api::{
    AnalyzeIssueRequest, AnalyzeIssueResponse, DailyMonitorRequest, DailyMonitorResponse,
    FindBeginnerIssuesRequest, FindBeginnerIssuesResponse, IssueRecommendation,
    ProjectSearchResult, SearchProjectsRequest, SearchProjectsResponse,
};
use crate::context::AppContext;

/// How many listed issues each discovery request analyzes.
const DISCOVERY_ANALYSIS_PREFIX: usize = 5;
/// Cap on recommendations returned by a discovery request.
const DISCOVERY_RESULT_CAP: usize = 10;
/// Cap on recommendations carried by one digest card.
const DIGEST_RECOMMENDATION_CAP: usize = 5;
/// How many matched catalog projects a search request analyzes.
const SEARCH_PROJECT_PREFIX: usize = 5;
/// How many catalog projects the daily sweep visits.
const MONITOR_PROJECT_PREFIX: usize = 10;
/// How many issues per project the daily sweep analyzes.
const MONITOR_ISSUE_PREFIX: usize = 3;

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Labels used to list beginner-friendly issues for a repository: the
/// catalog entry's configured labels when the repository is cataloged,
/// otherwise the conventional default.
fn beginner_labels(context: &AppContext, owner: &str, repo: &str) -> Vec<String> {
    context
        .catalog
        .projects
        .iter()
        .find(|project| {
            project.owner.eq_ignore_ascii_case(owner)
                && project.repo_name().eq_ignore_ascii_case(repo)
        })
        .map(|project| project.good_first_issue_labels.clone())
        .unwrap_or_else(|| vec!["good first issue".to_string()])
}

fn breakdown_summary(analysis: &IssueAnalysis) -> String {
    analysis
        .technical_breakdown
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}: {text}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn digest_recommendation(issue: &Issue, analysis: &IssueAnalysis) -> DigestRecommendation {
    DigestRecommendation {
        title: issue.title.clone(),
        url: issue.html_url.clone(),
        difficulty: analysis.difficulty_level.as_str().to_string(),
        estimated_time: analysis.estimated_time.clone(),
        required_skills: analysis.required_skills.clone(),
        solution_approach: analysis.solution_approach.clone(),
        technical_breakdown: breakdown_summary(analysis),
    }
}

/// Delivers a digest card to the configured user via the messaging API, or
/// to the webhook when no user is configured.
async fn deliver_digest(context: &AppContext, card: &Value) {
    let delivered = match &context.user_recipient {
        Some(recipient) => context.notifier.send_card_to_user(recipient, card).await,
        None => context.notifier.send_webhook_card(card).await,
    };
    if !delivered {
        warn!("digest delivery failed");
    }
}

/// Single-issue analysis: fetch the issue and project docs, analyze, build a
/// plan when the caller supplied skills, and push cards out.
pub async fn analyze_issue(
    context: &AppContext,
    request: AnalyzeIssueRequest,
) -> Result<AnalyzeIssueResponse> {
    let issue = context
        .issues
        .issue_details(&request.owner, &request.repo, request.issue_number)
        .await
        .with_context(|| {
            format!(
                "failed to fetch issue {}/{}#{}",
                request.owner, request.repo, request.issue_number
            )
        })?;

    let readme = context.issues.readme(&request.owner, &request.repo).await;
    let contributing = context
        .issues
        .contributing_guide(&request.owner, &request.repo)
        .await;

    let outcome = context
        .analyzer
        .analyze_issue(&issue, &readme, &contributing)
        .await;
    if outcome.is_fallback() {
        info!(issue = issue.number, "analysis degraded to the default record");
    }
    let analysis = outcome.into_record();

    let contribution_plan = if request.user_skills.is_empty() {
        None
    } else {
        Some(
            context
                .analyzer
                .generate_plan(&issue, &analysis, &request.user_skills)
                .await,
        )
    };

    let slug = format!("{}/{}", request.owner, request.repo);
    let card = build_issue_card(&slug, &issue, &analysis);
    if !context.notifier.send_webhook_card(&card).await {
        warn!(%slug, issue = issue.number, "issue card delivery failed");
    }

    if let (Some(plan), Some(recipient)) = (&contribution_plan, &context.user_recipient) {
        let plan_card = build_plan_card(&issue, plan);
        if !context.notifier.send_card_to_user(recipient, &plan_card).await {
            warn!(recipient = recipient.id(), "plan card delivery failed");
        }
    }

    Ok(AnalyzeIssueResponse {
        issue,
        analysis,
        contribution_plan,
        timestamp: timestamp(),
    })
}

/// Beginner-issue discovery for one repository: labeled open issues (with a
/// fallback to the unfiltered open listing), a bounded analysis prefix, and
/// results sorted by ascending complexity.
pub async fn find_beginner_issues(
    context: &AppContext,
    request: FindBeginnerIssuesRequest,
) -> Result<FindBeginnerIssuesResponse> {
    let repository = context
        .issues
        .repository_info(&request.owner, &request.repo)
        .await
        .with_context(|| format!("failed to fetch repository {}/{}", request.owner, request.repo))?;

    let labels = beginner_labels(context, &request.owner, &request.repo);
    let mut issues = context
        .issues
        .list_issues(&request.owner, &request.repo, IssueState::Open, &labels)
        .await;
    if issues.is_empty() {
        info!(
            project = %repository.full_name,
            "no labeled issues; falling back to the unfiltered open listing"
        );
        issues = context
            .issues
            .list_issues(&request.owner, &request.repo, IssueState::Open, &[])
            .await;
    }
    let total_issues_found = issues.len();

    let readme = context.issues.readme(&request.owner, &request.repo).await;
    let contributing = context
        .issues
        .contributing_guide(&request.owner, &request.repo)
        .await;

    let mut recommendations = Vec::new();
    for issue in issues.iter().take(DISCOVERY_ANALYSIS_PREFIX) {
        let analysis = context
            .analyzer
            .analyze_issue(issue, &readme, &contributing)
            .await
            .into_record();
        if analysis.difficulty_level.is_approachable() {
            recommendations.push(IssueRecommendation {
                issue: issue.clone(),
                analysis,
            });
        }
    }

    recommendations.sort_by(|left, right| {
        left.analysis
            .complexity_score
            .total_cmp(&right.analysis.complexity_score)
    });

    if request.send_notification {
        let digest_entries: Vec<DigestRecommendation> = recommendations
            .iter()
            .take(DIGEST_RECOMMENDATION_CAP)
            .map(|recommendation| {
                digest_recommendation(&recommendation.issue, &recommendation.analysis)
            })
            .collect();
        let digest_project = DigestProject {
            name: repository.name.clone(),
            owner: request.owner.clone(),
            repo: request.repo.clone(),
        };
        let card =
            build_daily_digest_card(&[digest_project], total_issues_found, &digest_entries);
        deliver_digest(context, &card).await;
    }

    let recommended_issues = recommendations.len();
    recommendations.truncate(DISCOVERY_RESULT_CAP);

    Ok(FindBeginnerIssuesResponse {
        project: repository.full_name,
        total_issues_found,
        recommended_issues,
        issues: recommendations,
        timestamp: timestamp(),
    })
}

/// Keyword/experience search across the configured catalog, analyzing a
/// bounded prefix of the matches with a pacing delay between projects.
pub async fn search_projects(
    context: &AppContext,
    request: SearchProjectsRequest,
) -> Result<SearchProjectsResponse> {
    let Some(experience) = ExperienceLevel::parse(&request.experience_level) else {
        warn!(
            level = %request.experience_level,
            "unknown experience level matches no projects"
        );
        return Ok(SearchProjectsResponse {
            total_projects_found: 0,
            analyzed_projects: 0,
            projects: Vec::new(),
            timestamp: timestamp(),
        });
    };
    let matched: Vec<_> = context
        .catalog
        .filter(&request.keywords, experience)
        .into_iter()
        .cloned()
        .collect();
    let total_projects_found = matched.len();

    let mut projects = Vec::new();
    for (index, project) in matched.iter().take(SEARCH_PROJECT_PREFIX).enumerate() {
        if index > 0 {
            sleep(Duration::from_millis(context.pacing.search_delay_ms)).await;
        }

        let repository = match context
            .issues
            .repository_info(&project.owner, project.repo_name())
            .await
        {
            Ok(repository) => repository,
            Err(error) => {
                warn!(project = %project.name, %error, "skipping project after repository fetch failure");
                continue;
            }
        };

        let issues = context
            .issues
            .list_issues(
                &project.owner,
                project.repo_name(),
                IssueState::Open,
                &project.good_first_issue_labels,
            )
            .await;

        let sample_len = issues.len().min(request.max_issues);
        let analysis = context
            .analyzer
            .analyze_project(&repository, &issues[..sample_len])
            .await
            .into_record();

        projects.push(ProjectSearchResult {
            name: project.name.clone(),
            category: project.category.clone(),
            repository,
            open_beginner_issues: issues.len(),
            analysis,
        });
    }

    Ok(SearchProjectsResponse {
        total_projects_found,
        analyzed_projects: projects.len(),
        projects,
        timestamp: timestamp(),
    })
}

/// Daily sweep over the catalog: bounded project and per-project issue
/// prefixes, then one digest card to the configured user.
pub async fn daily_monitor(
    context: &AppContext,
    _request: DailyMonitorRequest,
) -> Result<DailyMonitorResponse> {
    let mut digest_projects = Vec::new();
    let mut recommendations = Vec::new();
    let mut total_issues_found = 0usize;

    for (index, project) in context
        .catalog
        .projects
        .iter()
        .take(MONITOR_PROJECT_PREFIX)
        .enumerate()
    {
        if index > 0 {
            sleep(Duration::from_millis(context.pacing.monitor_delay_ms)).await;
        }

        digest_projects.push(DigestProject {
            name: project.name.clone(),
            owner: project.owner.clone(),
            repo: project.repo_name().to_string(),
        });

        let issues = context
            .issues
            .list_issues(
                &project.owner,
                project.repo_name(),
                IssueState::Open,
                &project.good_first_issue_labels,
            )
            .await;
        total_issues_found += issues.len();
        if issues.is_empty() {
            continue;
        }

        let readme = context
            .issues
            .readme(&project.owner, project.repo_name())
            .await;
        for issue in issues.iter().take(MONITOR_ISSUE_PREFIX) {
            let analysis = context
                .analyzer
                .analyze_issue(issue, &readme, "")
                .await
                .into_record();
            if analysis.difficulty_level.is_approachable() {
                recommendations.push(digest_recommendation(issue, &analysis));
            }
        }
    }

    let card = build_daily_digest_card(&digest_projects, total_issues_found, &recommendations);
    deliver_digest(context, &card).await;

    Ok(DailyMonitorResponse {
        monitored_projects: digest_projects.len(),
        total_issues_found,
        recommendations_found: recommendations.len(),
        timestamp: timestamp(),
    })
}
