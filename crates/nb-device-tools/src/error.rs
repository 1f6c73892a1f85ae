//! Device adapter error types.

use thiserror::Error;

/// Errors raised while talking to a device or a batch tool.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{operation} returned unexpected HTTP status {status}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    #[error("SSH error: {0}")]
    Ssh(String),

    #[error("authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    #[error("NETCONF error: {0}")]
    Netconf(String),

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for DeviceError {
    fn from(e: reqwest::Error) -> Self {
        DeviceError::Http(e.to_string())
    }
}

impl From<russh::Error> for DeviceError {
    fn from(e: russh::Error) -> Self {
        DeviceError::Ssh(e.to_string())
    }
}

/// Convenience alias for device adapter results.
pub type DeviceResult<T> = Result<T, DeviceError>;
