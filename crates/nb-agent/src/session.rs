//! Per-process conversation state.

use nb_protocol::{DeviceAddr, MethodKind};

/// Selected method and last-addressed device for the single chat session.
///
/// Owned by the poll loop and lent `&mut` to the dispatcher, which is its
/// only writer.
#[derive(Debug, Clone, Default)]
pub struct Session {
    method: Option<MethodKind>,
    last_ip: Option<DeviceAddr>,
}

impl Session {
    /// Fresh session: no method selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session remembering a configured default device.
    pub fn with_last_ip(last_ip: Option<DeviceAddr>) -> Self {
        Self {
            method: None,
            last_ip,
        }
    }

    pub fn method(&self) -> Option<MethodKind> {
        self.method
    }

    /// Select a method, replacing any previous choice.
    pub fn set_method(&mut self, method: MethodKind) {
        self.method = Some(method);
    }

    pub fn last_ip(&self) -> Option<&DeviceAddr> {
        self.last_ip.as_ref()
    }

    pub fn set_last_ip(&mut self, ip: DeviceAddr) {
        self.last_ip = Some(ip);
    }
}
