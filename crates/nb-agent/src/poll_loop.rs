//! Chat polling loop.
//!
//! Polls the room for its newest message, dispatches it once, and posts the
//! reply. Chat failures are logged and retried with exponential backoff;
//! they never end the loop.

use std::time::Duration;

use nb_chat_channel::{ChatChannel, ChatResult};
use nb_protocol::Reply;

use crate::dispatcher::CommandDispatcher;
use crate::session::Session;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// What one poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Room is empty.
    Idle,
    /// Newest message was already processed.
    Duplicate,
    /// Newest message is not addressed to this session.
    Ignored,
    Replied,
}

/// Doubling retry delay, capped.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait now; doubles the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL_BACKOFF, MAX_BACKOFF)
    }
}

/// Poll until the task is cancelled.
pub async fn run(
    channel: &dyn ChatChannel,
    dispatcher: &CommandDispatcher<'_>,
    session: &mut Session,
    poll_interval: Duration,
) {
    let mut last_id: Option<String> = None;
    let mut backoff = Backoff::default();

    loop {
        match poll_once(channel, dispatcher, session, &mut last_id).await {
            Ok(outcome) => {
                backoff.reset();
                if outcome == PollOutcome::Replied {
                    tracing::debug!("reply sent");
                }
                tokio::time::sleep(poll_interval).await;
            }
            Err(e) => {
                let delay = backoff.next_delay();
                tracing::error!(
                    error = %e,
                    retry_in_secs = delay.as_secs(),
                    "chat poll failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// One poll: fetch the newest message and handle it if it is new.
///
/// The message id is recorded before dispatch, so a command whose reply
/// fails to post is not executed a second time.
pub async fn poll_once(
    channel: &dyn ChatChannel,
    dispatcher: &CommandDispatcher<'_>,
    session: &mut Session,
    last_id: &mut Option<String>,
) -> ChatResult<PollOutcome> {
    let Some(message) = channel.latest_message().await? else {
        return Ok(PollOutcome::Idle);
    };
    if last_id.as_deref() == Some(message.id.as_str()) {
        return Ok(PollOutcome::Duplicate);
    }
    *last_id = Some(message.id.clone());

    let Some(reply) = dispatcher.handle_text(session, &message.text).await else {
        tracing::debug!(message_id = %message.id, "ignoring unaddressed message");
        return Ok(PollOutcome::Ignored);
    };

    tracing::info!(message_id = %message.id, command = %message.text, "handled command");
    send_reply(channel, &reply).await?;
    Ok(PollOutcome::Replied)
}

async fn send_reply(channel: &dyn ChatChannel, reply: &Reply) -> ChatResult<()> {
    match reply {
        Reply::Text { text } => channel.send_text(text).await,
        Reply::FileAttachment { caption, path } => channel.send_file(caption, path).await,
    }
}
