//! Mock chat channel for testing without a chat service.
//!
//! `latest_message` replays queued results in order and then keeps returning
//! the last message seen, the way a quiet room does. Replies are recorded.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::channel::ChatChannel;
use crate::error::{ChatError, ChatResult};
use crate::message::ChatMessage;

/// A recorded reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text(String),
    File { caption: String, path: PathBuf },
}

impl SentMessage {
    /// Text body, or the caption for attachments.
    pub fn body(&self) -> &str {
        match self {
            SentMessage::Text(text) => text,
            SentMessage::File { caption, .. } => caption,
        }
    }
}

/// Mock implementation of the `ChatChannel` trait.
pub struct MockChatChannel {
    /// `Err(status)` entries simulate API failures.
    inbound: Mutex<VecDeque<Result<ChatMessage, u16>>>,
    last_seen: Mutex<Option<ChatMessage>>,
    sent: Mutex<Vec<SentMessage>>,
    polls: Mutex<usize>,
}

impl MockChatChannel {
    pub fn new() -> Self {
        Self {
            inbound: Mutex::new(VecDeque::new()),
            last_seen: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            polls: Mutex::new(0),
        }
    }

    /// Queue a message to appear as the newest in the room.
    pub fn push_message(&self, id: &str, text: &str) {
        self.inbound
            .lock()
            .unwrap()
            .push_back(Ok(ChatMessage::new(id, text)));
    }

    /// Queue a failed poll with the given HTTP status.
    pub fn push_failure(&self, status: u16) {
        self.inbound.lock().unwrap().push_back(Err(status));
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.body().to_string())
            .collect()
    }

    /// Number of `latest_message` calls so far.
    pub fn poll_count(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

impl Default for MockChatChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatChannel for MockChatChannel {
    async fn latest_message(&self) -> ChatResult<Option<ChatMessage>> {
        *self.polls.lock().unwrap() += 1;
        match self.inbound.lock().unwrap().pop_front() {
            Some(Ok(msg)) => {
                *self.last_seen.lock().unwrap() = Some(msg.clone());
                Ok(Some(msg))
            }
            Some(Err(status)) => Err(ChatError::Api {
                status,
                body: "mock failure".into(),
            }),
            None => Ok(self.last_seen.lock().unwrap().clone()),
        }
    }

    async fn send_text(&self, text: &str) -> ChatResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push(SentMessage::Text(text.to_string()));
        Ok(())
    }

    async fn send_file(&self, caption: &str, path: &Path) -> ChatResult<()> {
        self.sent.lock().unwrap().push(SentMessage::File {
            caption: caption.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }
}
