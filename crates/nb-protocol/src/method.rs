use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured configuration transport selected for device mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// RESTCONF over HTTPS (YANG/JSON).
    Restconf,
    /// NETCONF over SSH (YANG/XML).
    Netconf,
}

impl MethodKind {
    /// Every selectable method, in keyword order.
    pub const ALL: [MethodKind; 2] = [MethodKind::Restconf, MethodKind::Netconf];

    /// Lower-case keyword as typed in chat.
    pub fn keyword(self) -> &'static str {
        match self {
            MethodKind::Restconf => "restconf",
            MethodKind::Netconf => "netconf",
        }
    }

    /// Case-insensitive match against the method vocabulary.
    pub fn from_keyword(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.keyword().eq_ignore_ascii_case(token))
    }
}

/// Displays as the capitalized keyword ("Restconf", "Netconf"), which is
/// the form used verbatim in chat replies.
impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&capitalize(self.keyword()))
    }
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
