use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::method::MethodKind;

/// Reply when a method is required but none is selected, or nothing
/// follows the address prefix.
pub const NO_METHOD: &str = "Error: No method specified";
/// Reply to an address with no command word.
pub const NO_COMMAND: &str = "Error: No command found.";
/// Reply to a banner write whose text is blank.
pub const NO_MOTD_TEXT: &str = "Error: No MOTD text provided";
/// Reply to a successful banner write.
pub const BANNER_WRITTEN: &str = "Ok: success";
/// Caption attached to the running-config file.
pub const RUNNING_CONFIG_CAPTION: &str = "show running config";

/// What goes back to the chat room for one processed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Text { text: String },
    FileAttachment { caption: String, path: PathBuf },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text { text: text.into() }
    }

    pub fn file(caption: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Reply::FileAttachment {
            caption: caption.into(),
            path: path.into(),
        }
    }

    /// Text body, or the caption for attachments.
    pub fn body(&self) -> &str {
        match self {
            Reply::Text { text } => text,
            Reply::FileAttachment { caption, .. } => caption,
        }
    }
}

/// `Ok: <Method>`, sent after a method is selected.
pub fn method_selected(method: MethodKind) -> String {
    format!("Ok: {method}")
}

/// Suffix for mutations that succeeded.
pub fn using(message: &str, method: MethodKind) -> String {
    format!("{message} using {method}")
}

/// Suffix for status reads and checked disable failures.
pub fn checked_by(message: &str, method: MethodKind) -> String {
    format!("{message} (checked by {method})")
}
