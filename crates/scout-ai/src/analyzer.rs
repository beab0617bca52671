//! The analysis layer: never raises, degrades to a fixed default record.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use scout_github::{Issue, Repository};

use crate::extract::extract_json_object;
use crate::prompts::{
    issue_analysis_prompt, plan_prompt, project_analysis_prompt, ISSUE_SYSTEM_PROMPT,
    PLAN_SYSTEM_PROMPT, PROJECT_SYSTEM_PROMPT,
};
use crate::types::{
    AnalysisOutcome, ChatClient, ChatMessage, ChatRequest, FallbackReason, IssueAnalysis,
    ProjectAnalysis,
};

const ISSUE_TEMPERATURE: f64 = 0.3;
const ISSUE_MAX_TOKENS: u32 = 2000;
const PROJECT_TEMPERATURE: f64 = 0.2;
const PROJECT_MAX_TOKENS: u32 = 1500;
const PLAN_TEMPERATURE: f64 = 0.3;
const PLAN_MAX_TOKENS: u32 = 1500;

#[derive(Debug, Clone)]
/// Model selection for the analyzer.
pub struct AnalyzerConfig {
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Personalized contribution plan with its generation timestamp.
pub struct ContributionPlan {
    pub plan: String,
    pub generated_at: String,
}

/// Issue and project triage backed by a chat-completion client.
///
/// `analyze_issue` and `analyze_project` uphold a deliberate contract:
/// degraded output beats a failed request, so any transport or extraction
/// failure becomes an `AnalysisOutcome::Fallback` rather than an error.
#[derive(Clone)]
pub struct Analyzer {
    chat: Arc<dyn ChatClient>,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(chat: Arc<dyn ChatClient>, config: AnalyzerConfig) -> Self {
        Self { chat, config }
    }

    pub async fn analyze_issue(
        &self,
        issue: &Issue,
        readme: &str,
        contributing: &str,
    ) -> AnalysisOutcome<IssueAnalysis> {
        let prompt = issue_analysis_prompt(issue, readme, contributing);
        match self
            .complete(
                ISSUE_SYSTEM_PROMPT,
                prompt,
                ISSUE_TEMPERATURE,
                ISSUE_MAX_TOKENS,
            )
            .await
        {
            Ok(reply) => match extract_json_object(&reply) {
                Some((value, _)) => {
                    AnalysisOutcome::Parsed(IssueAnalysis::from_model_value(issue.id, &value))
                }
                None => {
                    warn!(issue = issue.number, "no JSON object in analysis reply");
                    AnalysisOutcome::Fallback {
                        record: IssueAnalysis::fallback(issue.id),
                        reason: FallbackReason::ExtractionFailed,
                    }
                }
            },
            Err(error) => {
                warn!(issue = issue.number, %error, "issue analysis request failed");
                AnalysisOutcome::Fallback {
                    record: IssueAnalysis::fallback(issue.id),
                    reason: FallbackReason::RequestFailed(error.to_string()),
                }
            }
        }
    }

    pub async fn analyze_project(
        &self,
        repository: &Repository,
        issue_sample: &[Issue],
    ) -> AnalysisOutcome<ProjectAnalysis> {
        let prompt = project_analysis_prompt(repository, issue_sample);
        let name = repository.name.clone();
        match self
            .complete(
                PROJECT_SYSTEM_PROMPT,
                prompt,
                PROJECT_TEMPERATURE,
                PROJECT_MAX_TOKENS,
            )
            .await
        {
            Ok(reply) => match extract_json_object(&reply) {
                Some((value, _)) => {
                    AnalysisOutcome::Parsed(ProjectAnalysis::from_model_value(name, &value))
                }
                None => {
                    warn!(project = %name, "no JSON object in project analysis reply");
                    AnalysisOutcome::Fallback {
                        record: ProjectAnalysis::fallback(name),
                        reason: FallbackReason::ExtractionFailed,
                    }
                }
            },
            Err(error) => {
                warn!(project = %name, %error, "project analysis request failed");
                AnalysisOutcome::Fallback {
                    record: ProjectAnalysis::fallback(name),
                    reason: FallbackReason::RequestFailed(error.to_string()),
                }
            }
        }
    }

    /// Generates a contribution plan; on failure returns a fixed apology
    /// string so the caller still gets a well-formed payload.
    pub async fn generate_plan(
        &self,
        issue: &Issue,
        analysis: &IssueAnalysis,
        user_skills: &[String],
    ) -> ContributionPlan {
        let prompt = plan_prompt(issue, analysis, user_skills);
        let plan = match self
            .complete(PLAN_SYSTEM_PROMPT, prompt, PLAN_TEMPERATURE, PLAN_MAX_TOKENS)
            .await
        {
            Ok(reply) => reply,
            Err(error) => {
                warn!(issue = issue.number, %error, "plan generation failed");
                "unable to generate a contribution plan".to_string()
            }
        };

        ContributionPlan {
            plan,
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: String,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, crate::types::AiError> {
        let response = self
            .chat
            .complete(ChatRequest {
                model: self.config.model.clone(),
                messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
                temperature: Some(temperature),
                max_tokens: Some(max_tokens),
            })
            .await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use scout_github::Issue;

    use super::{Analyzer, AnalyzerConfig};
    use crate::types::{
        AiError, AnalysisOutcome, ChatClient, ChatRequest, ChatResponse, ChatUsage, Difficulty,
        FallbackReason,
    };

    struct CannedChat {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl ChatClient for CannedChat {
        async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, AiError> {
            match &self.reply {
                Ok(content) => Ok(ChatResponse {
                    content: content.clone(),
                    finish_reason: Some("stop".to_string()),
                    usage: ChatUsage::default(),
                }),
                Err(detail) => Err(AiError::InvalidResponse(detail.clone())),
            }
        }
    }

    fn analyzer(reply: Result<String, String>) -> Analyzer {
        Analyzer::new(
            Arc::new(CannedChat { reply }),
            AnalyzerConfig {
                model: "gpt-4o-mini".to_string(),
            },
        )
    }

    fn issue() -> Issue {
        Issue {
            id: 7,
            number: 12,
            title: "docs gap".to_string(),
            body: "body".to_string(),
            state: "open".to_string(),
            labels: vec![],
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            html_url: "https://github.com/apache/druid/issues/12".to_string(),
            comments: 0,
            assignee: None,
            milestone: None,
        }
    }

    #[tokio::test]
    async fn unit_fenced_reply_parses_with_defaults_for_missing_fields() {
        let analyzer = analyzer(Ok(
            "```json\n{\"complexity_score\":0.9,\"difficulty_level\":\"advanced\"}\n```"
                .to_string(),
        ));
        let outcome = analyzer.analyze_issue(&issue(), "", "").await;
        let AnalysisOutcome::Parsed(record) = outcome else {
            panic!("expected parsed outcome");
        };
        assert_eq!(record.complexity_score, 0.9);
        assert_eq!(record.difficulty_level, Difficulty::Advanced);
        assert_eq!(record.confidence_score, 0.5);
    }

    #[tokio::test]
    async fn unit_unparseable_reply_degrades_to_exact_default_record() {
        let analyzer = analyzer(Ok("I am unable to answer in JSON.".to_string()));
        let outcome = analyzer.analyze_issue(&issue(), "", "").await;
        let AnalysisOutcome::Fallback { record, reason } = outcome else {
            panic!("expected fallback outcome");
        };
        assert_eq!(reason, FallbackReason::ExtractionFailed);
        assert_eq!(record.complexity_score, 0.5);
        assert_eq!(record.difficulty_level, Difficulty::Intermediate);
        assert_eq!(record.confidence_score, 0.5);
        assert!(record.required_skills.is_empty());
    }

    #[tokio::test]
    async fn unit_transport_failure_degrades_with_request_reason() {
        let analyzer = analyzer(Err("connection refused".to_string()));
        let outcome = analyzer.analyze_issue(&issue(), "", "").await;
        assert!(outcome.is_fallback());
        let AnalysisOutcome::Fallback { reason, .. } = outcome else {
            unreachable!();
        };
        assert!(matches!(reason, FallbackReason::RequestFailed(_)));
    }

    #[tokio::test]
    async fn unit_plan_generation_survives_transport_failure() {
        let analyzer = analyzer(Err("boom".to_string()));
        let plan = analyzer
            .generate_plan(&issue(), &crate::types::IssueAnalysis::fallback(7), &[])
            .await;
        assert_eq!(plan.plan, "unable to generate a contribution plan");
        assert!(!plan.generated_at.is_empty());
    }
}
