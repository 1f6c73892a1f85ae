//! Chat channel: read the newest room message, post text or a file.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::config::WebexConfig;
use crate::error::{ChatError, ChatResult};
use crate::message::{ChatMessage, MessageList};

// ── ChatChannel trait ─────────────────────────────────────────

/// Room-scoped chat operations. Enables mocking in tests without a chat
/// service.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// The most recent message in the room, if any.
    async fn latest_message(&self) -> ChatResult<Option<ChatMessage>>;

    /// Post a plain-text message.
    async fn send_text(&self, text: &str) -> ChatResult<()>;

    /// Post a message with a text file attached.
    async fn send_file(&self, caption: &str, path: &Path) -> ChatResult<()>;
}

// ── WebexChannel ──────────────────────────────────────────────

/// Webex messages API client bound to one room.
pub struct WebexChannel {
    client: reqwest::Client,
    config: WebexConfig,
}

impl WebexChannel {
    pub fn new(config: WebexConfig) -> ChatResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.config.api_base.trim_end_matches('/'))
    }

    async fn check(response: reqwest::Response) -> ChatResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "chat API returned an error");
        Err(ChatError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ChatChannel for WebexChannel {
    async fn latest_message(&self) -> ChatResult<Option<ChatMessage>> {
        let response = self
            .client
            .get(self.messages_url())
            .bearer_auth(&self.config.access_token)
            .query(&[("roomId", self.config.room_id.as_str()), ("max", "1")])
            .send()
            .await?;
        let list: MessageList = Self::check(response).await?.json().await?;
        Ok(list.items.into_iter().next())
    }

    async fn send_text(&self, text: &str) -> ChatResult<()> {
        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "roomId": self.config.room_id, "text": text }))
            .send()
            .await?;
        Self::check(response).await?;
        tracing::debug!(len = text.len(), "posted text reply");
        Ok(())
    }

    async fn send_file(&self, caption: &str, path: &Path) -> ChatResult<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment.txt".to_string());
        let part = Part::bytes(bytes).file_name(file_name).mime_str("text/plain")?;
        let form = Form::new()
            .text("roomId", self.config.room_id.clone())
            .text("text", caption.to_string())
            .part("files", part);

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(&self.config.access_token)
            .multipart(form)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::debug!(path = %path.display(), "posted file reply");
        Ok(())
    }
}
