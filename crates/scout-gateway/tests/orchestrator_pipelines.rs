use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use scout_ai::{
    AiError, Analyzer, AnalyzerConfig, ChatClient, ChatRequest, ChatResponse, ChatUsage,
};
use scout_core::{CatalogProject, ProjectCatalog};
use scout_gateway::{
    analyze_issue, daily_monitor, find_beginner_issues, search_projects, AnalyzeIssueRequest,
    AppContext, DailyMonitorRequest, FindBeginnerIssuesRequest, IssueSource, PacingConfig,
    SearchProjectsRequest,
};
use scout_github::{GithubError, Issue, IssueState, Repository};
use scout_lark::{Notifier, Recipient};

fn issue(id: u64, number: u64) -> Issue {
    Issue {
        id,
        number,
        title: format!("issue {number}"),
        body: "body".to_string(),
        state: "open".to_string(),
        labels: vec![],
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        html_url: format!("https://github.com/apache/druid/issues/{number}"),
        comments: 0,
        assignee: None,
        milestone: None,
    }
}

fn repository(full_name: &str) -> Repository {
    Repository {
        name: full_name.split('/').next_back().unwrap_or_default().to_string(),
        full_name: full_name.to_string(),
        description: Some("a data store".to_string()),
        language: Some("Java".to_string()),
        stargazers_count: 12_000,
        forks_count: 3_000,
        open_issues_count: 40,
        updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
    }
}

/// Issue source returning scripted listings and recording the label filters
/// it was called with.
#[derive(Default)]
struct ScriptedIssues {
    labeled: Vec<Issue>,
    unlabeled: Vec<Issue>,
    detail: Option<Issue>,
    fail_repository_for: Option<String>,
    label_calls: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl IssueSource for ScriptedIssues {
    async fn repository_info(&self, owner: &str, repo: &str) -> Result<Repository, GithubError> {
        if self.fail_repository_for.as_deref() == Some(repo) {
            return Err(GithubError::Status {
                status: 404,
                body: "missing".to_string(),
            });
        }
        Ok(repository(&format!("{owner}/{repo}")))
    }

    async fn list_issues(
        &self,
        _owner: &str,
        _repo: &str,
        _state: IssueState,
        labels: &[String],
    ) -> Vec<Issue> {
        self.label_calls
            .lock()
            .unwrap()
            .push(labels.to_vec());
        if labels.is_empty() {
            self.unlabeled.clone()
        } else {
            self.labeled.clone()
        }
    }

    async fn issue_details(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
    ) -> Result<Issue, GithubError> {
        self.detail.clone().ok_or(GithubError::Status {
            status: 404,
            body: format!("issue {issue_number} not found"),
        })
    }

    async fn readme(&self, _owner: &str, _repo: &str) -> String {
        "# readme".to_string()
    }

    async fn contributing_guide(&self, _owner: &str, _repo: &str) -> String {
        String::new()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    webhook_cards: Mutex<Vec<Value>>,
    user_cards: Mutex<Vec<(Recipient, Value)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_webhook_card(&self, card: &Value) -> bool {
        self.webhook_cards.lock().unwrap().push(card.clone());
        true
    }

    async fn send_card_to_user(&self, recipient: &Recipient, card: &Value) -> bool {
        self.user_cards
            .lock()
            .unwrap()
            .push((recipient.clone(), card.clone()));
        true
    }
}

/// Chat stub replaying a queue of replies; repeats the last reply once the
/// queue runs dry.
struct SequencedChat {
    replies: Mutex<VecDeque<String>>,
    last: String,
}

impl SequencedChat {
    fn new(replies: Vec<&str>) -> Self {
        let last = replies.last().map(|s| s.to_string()).unwrap_or_default();
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            last,
        }
    }
}

#[async_trait]
impl ChatClient for SequencedChat {
    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, AiError> {
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.clone());
        Ok(ChatResponse {
            content,
            finish_reason: Some("stop".to_string()),
            usage: ChatUsage::default(),
        })
    }
}

fn context(
    issues: Arc<ScriptedIssues>,
    notifier: Arc<RecordingNotifier>,
    chat: SequencedChat,
    catalog: ProjectCatalog,
    user_recipient: Option<Recipient>,
) -> AppContext {
    AppContext {
        issues,
        analyzer: Analyzer::new(
            Arc::new(chat),
            AnalyzerConfig {
                model: "gpt-4o-mini".to_string(),
            },
        ),
        notifier,
        catalog,
        user_recipient,
        pacing: PacingConfig {
            search_delay_ms: 0,
            monitor_delay_ms: 0,
        },
    }
}

fn catalog_project(name: &str, beginner_friendly: bool) -> CatalogProject {
    CatalogProject {
        name: name.to_string(),
        owner: "apache".to_string(),
        repo: String::new(),
        category: "bigdata".to_string(),
        beginner_friendly,
        good_first_issue_labels: vec!["good-first-issue".to_string()],
    }
}

#[tokio::test]
async fn analyze_issue_builds_plan_and_sends_both_cards() {
    let notifier = Arc::new(RecordingNotifier::default());
    let context = context(
        Arc::new(ScriptedIssues {
            detail: Some(issue(1, 42)),
            ..Default::default()
        }),
        notifier.clone(),
        SequencedChat::new(vec![
            "{\"complexity_score\":0.3,\"difficulty_level\":\"beginner\"}",
            "1. Read the docs\n2. Reproduce",
        ]),
        ProjectCatalog::default(),
        Some(Recipient::from_id("ou_user")),
    );

    let response = analyze_issue(
        &context,
        AnalyzeIssueRequest {
            owner: "apache".to_string(),
            repo: "druid".to_string(),
            issue_number: 42,
            user_skills: vec!["SQL".to_string()],
        },
    )
    .await
    .expect("pipeline should succeed");

    assert_eq!(response.issue.number, 42);
    assert_eq!(response.analysis.complexity_score, 0.3);
    let plan = response.contribution_plan.expect("skills imply a plan");
    assert!(plan.plan.contains("Read the docs"));
    assert_eq!(notifier.webhook_cards.lock().unwrap().len(), 1);
    let user_cards = notifier.user_cards.lock().unwrap();
    assert_eq!(user_cards.len(), 1);
    assert_eq!(user_cards[0].0, Recipient::from_id("ou_user"));
}

#[tokio::test]
async fn analyze_issue_without_skills_skips_the_plan() {
    let notifier = Arc::new(RecordingNotifier::default());
    let context = context(
        Arc::new(ScriptedIssues {
            detail: Some(issue(1, 42)),
            ..Default::default()
        }),
        notifier.clone(),
        SequencedChat::new(vec!["{\"complexity_score\":0.3}"]),
        ProjectCatalog::default(),
        Some(Recipient::from_id("ou_user")),
    );

    let response = analyze_issue(
        &context,
        AnalyzeIssueRequest {
            owner: "apache".to_string(),
            repo: "druid".to_string(),
            issue_number: 42,
            user_skills: vec![],
        },
    )
    .await
    .expect("pipeline should succeed");

    assert!(response.contribution_plan.is_none());
    assert!(notifier.user_cards.lock().unwrap().is_empty());
}

#[tokio::test]
async fn analyze_issue_propagates_detail_fetch_failure() {
    let notifier = Arc::new(RecordingNotifier::default());
    let context = context(
        Arc::new(ScriptedIssues::default()),
        notifier,
        SequencedChat::new(vec!["{}"]),
        ProjectCatalog::default(),
        None,
    );

    let error = analyze_issue(
        &context,
        AnalyzeIssueRequest {
            owner: "apache".to_string(),
            repo: "druid".to_string(),
            issue_number: 9,
            user_skills: vec![],
        },
    )
    .await
    .expect_err("missing issue must fail the request");
    assert!(error.to_string().contains("apache/druid#9"));
}

#[tokio::test]
async fn discovery_sorts_kept_results_by_ascending_complexity() {
    let notifier = Arc::new(RecordingNotifier::default());
    let context = context(
        Arc::new(ScriptedIssues {
            labeled: vec![issue(1, 1), issue(2, 2), issue(3, 3)],
            ..Default::default()
        }),
        notifier,
        SequencedChat::new(vec![
            "{\"complexity_score\":0.8,\"difficulty_level\":\"intermediate\"}",
            "{\"complexity_score\":0.2,\"difficulty_level\":\"beginner\"}",
            "{\"complexity_score\":0.5,\"difficulty_level\":\"beginner\"}",
        ]),
        ProjectCatalog::default(),
        None,
    );

    let response = find_beginner_issues(
        &context,
        FindBeginnerIssuesRequest {
            owner: "apache".to_string(),
            repo: "druid".to_string(),
            send_notification: false,
        },
    )
    .await
    .expect("discovery should succeed");

    let scores: Vec<f64> = response
        .issues
        .iter()
        .map(|entry| entry.analysis.complexity_score)
        .collect();
    assert_eq!(scores, vec![0.2, 0.5, 0.8]);
    assert_eq!(response.total_issues_found, 3);
    assert_eq!(response.recommended_issues, 3);
}

#[tokio::test]
async fn discovery_drops_advanced_results() {
    let notifier = Arc::new(RecordingNotifier::default());
    let context = context(
        Arc::new(ScriptedIssues {
            labeled: vec![issue(1, 1), issue(2, 2)],
            ..Default::default()
        }),
        notifier,
        SequencedChat::new(vec![
            "{\"complexity_score\":0.9,\"difficulty_level\":\"advanced\"}",
            "{\"complexity_score\":0.2,\"difficulty_level\":\"beginner\"}",
        ]),
        ProjectCatalog::default(),
        None,
    );

    let response = find_beginner_issues(
        &context,
        FindBeginnerIssuesRequest {
            owner: "apache".to_string(),
            repo: "druid".to_string(),
            send_notification: false,
        },
    )
    .await
    .expect("discovery should succeed");

    assert_eq!(response.recommended_issues, 1);
    assert_eq!(response.issues[0].issue.number, 2);
}

#[tokio::test]
async fn discovery_falls_back_to_unlabeled_listing() {
    let notifier = Arc::new(RecordingNotifier::default());
    let issues = Arc::new(ScriptedIssues {
        labeled: vec![],
        unlabeled: vec![issue(1, 1)],
        ..Default::default()
    });
    let context = context(
        issues.clone(),
        notifier,
        SequencedChat::new(vec![
            "{\"complexity_score\":0.2,\"difficulty_level\":\"beginner\"}",
        ]),
        ProjectCatalog::default(),
        None,
    );

    let response = find_beginner_issues(
        &context,
        FindBeginnerIssuesRequest {
            owner: "apache".to_string(),
            repo: "druid".to_string(),
            send_notification: false,
        },
    )
    .await
    .expect("discovery should succeed");

    assert_eq!(response.total_issues_found, 1);
    assert_eq!(response.issues.len(), 1);
    let label_calls = issues.label_calls.lock().unwrap();
    assert_eq!(label_calls.len(), 2);
    assert!(!label_calls[0].is_empty());
    assert!(label_calls[1].is_empty());
}

#[tokio::test]
async fn discovery_notification_is_one_digest_card() {
    let notifier = Arc::new(RecordingNotifier::default());
    let context = context(
        Arc::new(ScriptedIssues {
            labeled: vec![issue(1, 1), issue(2, 2)],
            ..Default::default()
        }),
        notifier.clone(),
        SequencedChat::new(vec![
            "{\"complexity_score\":0.2,\"difficulty_level\":\"beginner\"}",
        ]),
        ProjectCatalog::default(),
        None,
    );

    find_beginner_issues(
        &context,
        FindBeginnerIssuesRequest {
            owner: "apache".to_string(),
            repo: "druid".to_string(),
            send_notification: true,
        },
    )
    .await
    .expect("discovery should succeed");

    let cards = notifier.webhook_cards.lock().unwrap();
    assert_eq!(cards.len(), 1);
    let rendered = cards[0].to_string();
    assert!(rendered.contains("Daily contribution digest"));
    assert!(rendered.contains("issue 1"));
    assert!(rendered.contains("issue 2"));
}

#[tokio::test]
async fn discovery_digest_goes_to_configured_user() {
    let notifier = Arc::new(RecordingNotifier::default());
    let context = context(
        Arc::new(ScriptedIssues {
            labeled: vec![issue(1, 1)],
            ..Default::default()
        }),
        notifier.clone(),
        SequencedChat::new(vec![
            "{\"complexity_score\":0.2,\"difficulty_level\":\"beginner\"}",
        ]),
        ProjectCatalog::default(),
        Some(Recipient::from_id("ou_user")),
    );

    find_beginner_issues(
        &context,
        FindBeginnerIssuesRequest {
            owner: "apache".to_string(),
            repo: "druid".to_string(),
            send_notification: true,
        },
    )
    .await
    .expect("discovery should succeed");

    assert!(notifier.webhook_cards.lock().unwrap().is_empty());
    let user_cards = notifier.user_cards.lock().unwrap();
    assert_eq!(user_cards.len(), 1);
    assert_eq!(user_cards[0].0, Recipient::from_id("ou_user"));
}

#[tokio::test]
async fn search_skips_projects_whose_repository_fetch_fails() {
    let notifier = Arc::new(RecordingNotifier::default());
    let catalog = ProjectCatalog {
        projects: vec![catalog_project("spark", true), catalog_project("flink", true)],
    };
    let issues = Arc::new(ScriptedIssues {
        labeled: vec![issue(1, 1)],
        fail_repository_for: Some("spark".to_string()),
        ..Default::default()
    });
    let context = context(
        issues,
        notifier,
        SequencedChat::new(vec!["{\"beginner_friendliness\":0.7}"]),
        catalog,
        None,
    );

    let response = search_projects(
        &context,
        SearchProjectsRequest {
            keywords: vec![],
            experience_level: "beginner".to_string(),
            max_issues: 10,
        },
    )
    .await
    .expect("search should succeed");

    assert_eq!(response.total_projects_found, 2);
    assert_eq!(response.analyzed_projects, 1);
    assert_eq!(response.projects[0].name, "flink");
}

#[tokio::test]
async fn search_respects_experience_level_filter() {
    let notifier = Arc::new(RecordingNotifier::default());
    let catalog = ProjectCatalog {
        projects: vec![
            catalog_project("spark", true),
            catalog_project("flink", false),
        ],
    };
    let context = context(
        Arc::new(ScriptedIssues::default()),
        notifier,
        SequencedChat::new(vec!["{}"]),
        catalog,
        None,
    );

    let response = search_projects(
        &context,
        SearchProjectsRequest {
            keywords: vec![],
            experience_level: "advanced".to_string(),
            max_issues: 10,
        },
    )
    .await
    .expect("search should succeed");

    assert_eq!(response.total_projects_found, 1);
    assert_eq!(response.projects[0].name, "flink");
}

#[test]
fn search_request_defaults_to_beginner_experience() {
    let request: SearchProjectsRequest =
        serde_json::from_value(serde_json::json!({})).expect("empty body must deserialize");
    assert_eq!(request.experience_level, "beginner");
    assert_eq!(request.max_issues, 10);
    assert!(request.keywords.is_empty());
}

#[tokio::test]
async fn search_unknown_experience_level_matches_nothing() {
    let notifier = Arc::new(RecordingNotifier::default());
    let catalog = ProjectCatalog {
        projects: vec![
            catalog_project("spark", true),
            catalog_project("flink", false),
        ],
    };
    let context = context(
        Arc::new(ScriptedIssues::default()),
        notifier,
        SequencedChat::new(vec!["{}"]),
        catalog,
        None,
    );

    let response = search_projects(
        &context,
        SearchProjectsRequest {
            keywords: vec![],
            experience_level: "wizard".to_string(),
            max_issues: 10,
        },
    )
    .await
    .expect("search should succeed");

    assert_eq!(response.total_projects_found, 0);
    assert_eq!(response.analyzed_projects, 0);
    assert!(response.projects.is_empty());
}

#[tokio::test]
async fn daily_monitor_sends_one_digest_and_counts_recommendations() {
    let notifier = Arc::new(RecordingNotifier::default());
    let catalog = ProjectCatalog {
        projects: vec![catalog_project("druid", true)],
    };
    let context = context(
        Arc::new(ScriptedIssues {
            labeled: vec![issue(1, 1), issue(2, 2)],
            ..Default::default()
        }),
        notifier.clone(),
        SequencedChat::new(vec![
            "{\"complexity_score\":0.2,\"difficulty_level\":\"beginner\"}",
            "{\"complexity_score\":0.9,\"difficulty_level\":\"advanced\"}",
        ]),
        catalog,
        None,
    );

    let response = daily_monitor(&context, DailyMonitorRequest::default())
        .await
        .expect("sweep should succeed");

    assert_eq!(response.monitored_projects, 1);
    assert_eq!(response.total_issues_found, 2);
    assert_eq!(response.recommendations_found, 1);
    let cards = notifier.webhook_cards.lock().unwrap();
    assert_eq!(cards.len(), 1);
    assert!(cards[0].to_string().contains("Daily contribution digest"));
}
