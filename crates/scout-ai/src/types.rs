use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Role of one chat message.
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One message in a chat-completion request.
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A chat-completion request.
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
/// Token accounting reported by the provider.
pub struct ChatUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Assistant reply to a chat-completion request.
pub struct ChatResponse {
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: ChatUsage,
}

#[derive(Debug, Error)]
/// Errors surfaced by the chat transport layer.
pub enum AiError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
/// Trait contract for chat-completion backends.
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, AiError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// Difficulty tier assigned to an issue by the analysis step.
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Whether the tier is worth recommending to newer contributors.
    pub fn is_approachable(self) -> bool {
        matches!(self, Self::Beginner | Self::Intermediate)
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn object_map(value: Option<&Value>) -> Map<String, Value> {
    value
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Triage result for one issue.
///
/// Both scores lie in [0,1]; the difficulty tier is always one of the three
/// enumerated values (the default is substituted for anything else).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssueAnalysis {
    pub issue_id: u64,
    pub complexity_score: f64,
    pub difficulty_level: Difficulty,
    pub required_skills: Vec<String>,
    pub estimated_time: String,
    pub solution_approach: String,
    pub technical_breakdown: Map<String, Value>,
    pub learning_opportunities: Vec<String>,
    pub confidence_score: f64,
}

impl IssueAnalysis {
    /// The fixed record substituted whenever transport or extraction fails.
    pub fn fallback(issue_id: u64) -> Self {
        Self {
            issue_id,
            complexity_score: 0.5,
            difficulty_level: Difficulty::Intermediate,
            required_skills: Vec::new(),
            estimated_time: "unknown".to_string(),
            solution_approach: String::new(),
            technical_breakdown: Map::new(),
            learning_opportunities: Vec::new(),
            confidence_score: 0.5,
        }
    }

    /// Builds a record from an extracted model object, substituting the
    /// documented defaults for any absent or malformed field.
    pub fn from_model_value(issue_id: u64, value: &Value) -> Self {
        let defaults = Self::fallback(issue_id);
        Self {
            issue_id,
            complexity_score: value
                .get("complexity_score")
                .and_then(Value::as_f64)
                .map(clamp_score)
                .unwrap_or(defaults.complexity_score),
            difficulty_level: value
                .get("difficulty_level")
                .and_then(Value::as_str)
                .and_then(Difficulty::parse)
                .unwrap_or(defaults.difficulty_level),
            required_skills: string_list(value.get("required_skills")),
            estimated_time: value
                .get("estimated_time")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(defaults.estimated_time),
            solution_approach: value
                .get("solution_approach")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default(),
            technical_breakdown: object_map(value.get("technical_breakdown")),
            learning_opportunities: string_list(value.get("learning_opportunities")),
            confidence_score: value
                .get("confidence_score")
                .and_then(Value::as_f64)
                .map(clamp_score)
                .unwrap_or(defaults.confidence_score),
        }
    }
}

/// Triage result for a whole project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectAnalysis {
    pub project_name: String,
    pub beginner_friendliness: f64,
    pub active_maintenance: bool,
    pub community_health: Map<String, Value>,
    pub contribution_guidelines: Map<String, Value>,
    pub tech_stack_analysis: Map<String, Value>,
    pub recommended_issues: Vec<u64>,
}

impl ProjectAnalysis {
    pub fn fallback(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            beginner_friendliness: 0.5,
            active_maintenance: false,
            community_health: Map::new(),
            contribution_guidelines: Map::new(),
            tech_stack_analysis: Map::new(),
            recommended_issues: Vec::new(),
        }
    }

    pub fn from_model_value(project_name: impl Into<String>, value: &Value) -> Self {
        let defaults = Self::fallback(project_name);
        Self {
            beginner_friendliness: value
                .get("beginner_friendliness")
                .and_then(Value::as_f64)
                .map(clamp_score)
                .unwrap_or(defaults.beginner_friendliness),
            active_maintenance: value
                .get("active_maintenance")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.active_maintenance),
            community_health: object_map(value.get("community_health")),
            contribution_guidelines: object_map(value.get("contribution_guidelines")),
            tech_stack_analysis: object_map(value.get("tech_stack_analysis")),
            recommended_issues: value
                .get("recommended_issues")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_u64).collect())
                .unwrap_or_default(),
            project_name: defaults.project_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why an analysis degraded to the fixed default record.
pub enum FallbackReason {
    /// The chat request itself failed (transport or provider status).
    RequestFailed(String),
    /// The reply carried no extractable JSON object.
    ExtractionFailed,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(detail) => write!(f, "chat request failed: {detail}"),
            Self::ExtractionFailed => write!(f, "no extractable JSON object in reply"),
        }
    }
}

/// Distinguishes genuine model output from the degraded default record.
///
/// The analysis layer never raises: a failure anywhere in transport or
/// parsing becomes a `Fallback` carrying the fixed default.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome<T> {
    Parsed(T),
    Fallback { record: T, reason: FallbackReason },
}

impl<T> AnalysisOutcome<T> {
    pub fn record(&self) -> &T {
        match self {
            Self::Parsed(record) | Self::Fallback { record, .. } => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            Self::Parsed(record) | Self::Fallback { record, .. } => record,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}
