use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::method::MethodKind;

/// Dotted-quad shape only. Octet ranges are deliberately not checked, so
/// `999.999.999.999` is a valid address as far as the grammar goes.
static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(?:\.\d{1,3}){3}$").expect("static IPv4 pattern compiles")
});

/// Device address exactly as typed in chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceAddr(String);

impl DeviceAddr {
    /// Accept a token if it is syntactically a dotted quad.
    pub fn parse(token: &str) -> Option<Self> {
        IPV4_RE
            .is_match(token)
            .then(|| Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Device verb following the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Delete,
    Enable,
    Disable,
    Status,
    /// Full running-config dump via the batch runner.
    BulkConfigFetch,
    /// GigabitEthernet up/down summary via CLI scrape.
    GigabitStatus,
}

impl ActionKind {
    /// Canonical keyword, also used in "Error executing <action>" replies.
    pub fn keyword(self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Delete => "delete",
            ActionKind::Enable => "enable",
            ActionKind::Disable => "disable",
            ActionKind::Status => "status",
            ActionKind::BulkConfigFetch => "bulk_config_fetch",
            ActionKind::GigabitStatus => "gigabit_status",
        }
    }

    /// Match an action word (already lower-cased or not). `showrun` is
    /// accepted as an alias for the bulk config fetch.
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "create" => Some(ActionKind::Create),
            "delete" => Some(ActionKind::Delete),
            "enable" => Some(ActionKind::Enable),
            "disable" => Some(ActionKind::Disable),
            "status" => Some(ActionKind::Status),
            "bulk_config_fetch" | "showrun" => Some(ActionKind::BulkConfigFetch),
            "gigabit_status" => Some(ActionKind::GigabitStatus),
            _ => None,
        }
    }

    /// Actions that run without a selected method because they go through
    /// the CLI-scrape or batch-runner transports.
    pub fn is_method_exempt(self) -> bool {
        matches!(self, ActionKind::BulkConfigFetch | ActionKind::GigabitStatus)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Whether a word selects the banner command (`banner`, or the `motd` alias).
pub fn is_banner_keyword(token: &str) -> bool {
    token.eq_ignore_ascii_case("banner") || token.eq_ignore_ascii_case("motd")
}

/// Grammar violations that still deserve a reply.
///
/// The display text is the exact chat reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// First token is neither a lone method keyword nor an address.
    #[error("Error: No IP specified")]
    NoIp,
    /// Address followed by a word outside the command vocabulary.
    #[error("Error: No command or unknown command")]
    UnknownCommand(String),
}

/// One addressed chat line, structured. Produced fresh per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    SelectMethod(MethodKind),
    DeviceAction {
        device: DeviceAddr,
        action: ActionKind,
    },
    /// `text: None` reads the banner, `Some` writes it.
    BannerAction {
        device: DeviceAddr,
        text: Option<String>,
    },
    IpOnly(DeviceAddr),
    Malformed(ParseError),
    /// Prefix only, nothing after it.
    Empty,
}
