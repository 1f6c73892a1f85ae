//! Chat transport error types.

use thiserror::Error;

/// Errors that can occur while talking to the chat service.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("chat API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ChatError::Decode(e.to_string())
        } else {
            ChatError::Http(e.to_string())
        }
    }
}

impl From<std::io::Error> for ChatError {
    fn from(e: std::io::Error) -> Self {
        ChatError::Io(e.to_string())
    }
}

/// Convenience alias for chat results.
pub type ChatResult<T> = Result<T, ChatError>;
