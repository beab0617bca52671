//! Issue and project triage over an OpenAI-compatible chat-completion
//! endpoint: prompt construction, structured JSON extraction, and the
//! never-fails analysis contract.

mod analyzer;
mod extract;
mod openai;
mod prompts;
mod types;

pub use analyzer::{Analyzer, AnalyzerConfig, ContributionPlan};
pub use extract::{extract_json_object, ExtractionStrategy};
pub use openai::{OpenAiChatClient, OpenAiConfig};
pub use prompts::{issue_analysis_prompt, plan_prompt, project_analysis_prompt};
pub use types::{
    AiError, AnalysisOutcome, ChatClient, ChatMessage, ChatRequest, ChatResponse, ChatRole,
    ChatUsage, Difficulty, FallbackReason, IssueAnalysis, ProjectAnalysis,
};
