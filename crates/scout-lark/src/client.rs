//! Webhook and messaging-API delivery with tenant-token caching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use scout_core::{current_unix_timestamp, is_expired_unix, LarkConfig};

const REQUEST_TIMEOUT_MS: u64 = 30_000;
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum LarkError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Typed message destination. The wire protocol keys the receive-id type off
/// the identifier prefix, so classification happens once, at the edge.
pub enum Recipient {
    OpenId(String),
    ChatId(String),
}

impl Recipient {
    /// Classifies a raw identifier: `ou_` is a user open-id, `oc_` a chat id,
    /// anything else is treated as an open-id.
    pub fn from_id(id: &str) -> Self {
        if id.starts_with("oc_") {
            Self::ChatId(id.to_string())
        } else {
            Self::OpenId(id.to_string())
        }
    }

    pub fn receive_id_type(&self) -> &'static str {
        match self {
            Self::OpenId(_) => "open_id",
            Self::ChatId(_) => "chat_id",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::OpenId(id) | Self::ChatId(id) => id,
        }
    }
}

/// Delivery seam the orchestration layer depends on; both methods report
/// success as a boolean because notification failures never abort a pipeline.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_webhook_card(&self, card: &Value) -> bool;
    async fn send_card_to_user(&self, recipient: &Recipient, card: &Value) -> bool;
}

struct CachedToken {
    token: String,
    expires_unix: u64,
}

/// Client for the two delivery paths: the incoming webhook and the
/// tenant-token messaging API. Tokens are cached until five minutes before
/// their advertised expiry.
pub struct LarkClient {
    client: Client,
    config: LarkConfig,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct WebhookReply {
    code: Option<i64>,
    msg: Option<String>,
}

#[derive(Deserialize)]
struct TokenReply {
    code: i64,
    msg: Option<String>,
    tenant_access_token: Option<String>,
    expire: Option<u64>,
}

#[derive(Deserialize)]
struct MessageReply {
    code: Option<i64>,
    msg: Option<String>,
}

impl LarkClient {
    pub fn new(config: LarkConfig) -> Result<Self, LarkError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()?;
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    /// Returns a valid tenant access token, fetching a fresh one when the
    /// cached token is absent or within the expiry margin.
    async fn ensure_token(&self) -> Option<String> {
        let (app_id, app_secret) = match (&self.config.app_id, &self.config.app_secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                warn!("messaging API credentials are not configured");
                return None;
            }
        };

        let mut guard = self.token.lock().await;
        let now = current_unix_timestamp();
        if let Some(cached) = guard.as_ref() {
            if !is_expired_unix(Some(cached.expires_unix), now, TOKEN_EXPIRY_MARGIN_SECS) {
                return Some(cached.token.clone());
            }
        }

        let url = format!(
            "{}/auth/v3/tenant_access_token/internal",
            self.config.api_base.trim_end_matches('/')
        );
        let response = match self
            .client
            .post(&url)
            .json(&json!({"app_id": app_id, "app_secret": app_secret}))
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "tenant token request failed");
                return None;
            }
        };

        let reply: TokenReply = match response.json().await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "tenant token reply was not valid JSON");
                return None;
            }
        };

        if reply.code != 0 {
            warn!(
                code = reply.code,
                msg = reply.msg.as_deref().unwrap_or(""),
                "tenant token request rejected"
            );
            return None;
        }

        match (reply.tenant_access_token, reply.expire) {
            (Some(token), Some(expire)) => {
                *guard = Some(CachedToken {
                    token: token.clone(),
                    expires_unix: now + expire,
                });
                Some(token)
            }
            _ => {
                warn!("tenant token reply was missing token or expiry");
                None
            }
        }
    }
}

#[async_trait]
impl Notifier for LarkClient {
    /// Posts an interactive card to the configured webhook. Success means a
    /// 2xx status with remote `code == 0`; failures are logged, never retried.
    async fn send_webhook_card(&self, card: &Value) -> bool {
        let response = match self
            .client
            .post(&self.config.webhook_url)
            .json(&json!({"msg_type": "interactive", "card": card}))
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "webhook request failed");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body, "webhook returned non-success status");
            return false;
        }

        match response.json::<WebhookReply>().await {
            Ok(reply) if reply.code.unwrap_or(0) == 0 => {
                debug!("webhook card delivered");
                true
            }
            Ok(reply) => {
                warn!(
                    code = reply.code.unwrap_or(-1),
                    msg = reply.msg.as_deref().unwrap_or(""),
                    "webhook rejected the card"
                );
                false
            }
            Err(error) => {
                warn!(%error, "webhook reply was not valid JSON");
                false
            }
        }
    }

    /// Sends an interactive card through the messaging API to a single
    /// recipient, serializing the card document into the `content` field as
    /// the API requires.
    async fn send_card_to_user(&self, recipient: &Recipient, card: &Value) -> bool {
        let token = match self.ensure_token().await {
            Some(token) => token,
            None => return false,
        };

        let url = format!(
            "{}/im/v1/messages",
            self.config.api_base.trim_end_matches('/')
        );
        let response = match self
            .client
            .post(&url)
            .query(&[("receive_id_type", recipient.receive_id_type())])
            .bearer_auth(token)
            .json(&json!({
                "receive_id": recipient.id(),
                "msg_type": "interactive",
                "content": card.to_string(),
            }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "message request failed");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body, "message API returned non-success status");
            return false;
        }

        match response.json::<MessageReply>().await {
            Ok(reply) if reply.code.unwrap_or(0) == 0 => {
                debug!(recipient = recipient.id(), "card delivered to recipient");
                true
            }
            Ok(reply) => {
                warn!(
                    code = reply.code.unwrap_or(-1),
                    msg = reply.msg.as_deref().unwrap_or(""),
                    "message API rejected the card"
                );
                false
            }
            Err(error) => {
                warn!(%error, "message reply was not valid JSON");
                false
            }
        }
    }
}
