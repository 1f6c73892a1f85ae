use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One message read from the room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    #[serde(default)]
    pub room_id: String,
    /// Plain-text body; empty for attachment-only messages.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub person_email: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            room_id: String::new(),
            text: text.into(),
            person_email: None,
            created: None,
        }
    }
}

/// Body of a message list response.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageList {
    #[serde(default)]
    pub items: Vec<ChatMessage>,
}
