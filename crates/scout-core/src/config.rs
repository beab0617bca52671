//! Environment-backed service configuration.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised while loading or validating configuration.
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingRequired(&'static str),
    #[error("failed to read project catalog {path}: {source}")]
    CatalogIo {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse project catalog {path}: {source}")]
    CatalogParse {
        path: String,
        source: toml::de::Error,
    },
}

fn non_empty_env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Debug, Clone)]
/// Lark messaging credentials and destinations.
pub struct LarkConfig {
    pub webhook_url: String,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub user_id: Option<String>,
    pub api_base: String,
}

pub const DEFAULT_LARK_API_BASE: &str = "https://open.feishu.cn/open-apis";
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_MODEL_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
/// Top-level service configuration, populated from the environment.
pub struct ScoutConfig {
    pub github_token: String,
    pub github_api_base: String,
    pub model_api_key: String,
    pub model_id: String,
    pub model_api_base: String,
    pub lark: LarkConfig,
}

impl ScoutConfig {
    /// Loads configuration from the environment without validating it.
    ///
    /// Optional values that are unset or blank come back as empty strings or
    /// `None`; `validate` decides which absences are fatal.
    pub fn from_env() -> Self {
        Self {
            github_token: non_empty_env_var("GITHUB_TOKEN").unwrap_or_default(),
            github_api_base: non_empty_env_var("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string()),
            model_api_key: non_empty_env_var("LLM_API_KEY").unwrap_or_default(),
            model_id: non_empty_env_var("LLM_MODEL_ID").unwrap_or_default(),
            model_api_base: non_empty_env_var("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MODEL_API_BASE.to_string()),
            lark: LarkConfig {
                webhook_url: non_empty_env_var("LARK_WEBHOOK_URL").unwrap_or_default(),
                app_id: non_empty_env_var("LARK_APP_ID"),
                app_secret: non_empty_env_var("LARK_APP_SECRET"),
                user_id: non_empty_env_var("LARK_USER_ID"),
                api_base: non_empty_env_var("LARK_API_BASE")
                    .unwrap_or_else(|| DEFAULT_LARK_API_BASE.to_string()),
            },
        }
    }

    /// Fails when a credential the pipeline cannot run without is absent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github_token.is_empty() {
            return Err(ConfigError::MissingRequired("GITHUB_TOKEN"));
        }
        if self.model_api_key.is_empty() {
            return Err(ConfigError::MissingRequired("LLM_API_KEY"));
        }
        if self.lark.webhook_url.is_empty() {
            return Err(ConfigError::MissingRequired("LARK_WEBHOOK_URL"));
        }
        Ok(())
    }
}
