use std::fmt;

use serde::Deserialize;

/// `[webex]` configuration section.
#[derive(Clone, Deserialize)]
pub struct WebexConfig {
    /// API root, without a trailing slash.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Room the bot reads from and replies to.
    #[serde(default)]
    pub room_id: String,
    /// Bot access token (sent as a bearer token).
    #[serde(default)]
    pub access_token: String,
    /// Delay between polls of the room.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://webexapis.com/v1".into()
}

fn default_poll_interval() -> u64 {
    1
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for WebexConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            room_id: String::new(),
            access_token: String::new(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl fmt::Debug for WebexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebexConfig")
            .field("api_base", &self.api_base)
            .field("room_id", &self.room_id)
            .field("access_token", &"<redacted>")
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
