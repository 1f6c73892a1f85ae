//! Chat transport for netbot.
//!
//! - `ChatChannel` trait for reading the latest room message and posting
//!   replies (mockable in tests)
//! - `WebexChannel` talking to the Webex messages REST API
//! - `MockChatChannel` for testing without a chat service

pub mod channel;
pub mod config;
pub mod error;
pub mod message;
pub mod mock;

pub use channel::{ChatChannel, WebexChannel};
pub use config::WebexConfig;
pub use error::{ChatError, ChatResult};
pub use message::ChatMessage;
pub use mock::{MockChatChannel, SentMessage};
