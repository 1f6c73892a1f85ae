//! In-memory adapters for testing.
//!
//! Each mock records what it was asked and replays scripted results, so the
//! dispatcher and the adapters can be tested without a router.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use nb_protocol::{ActionKind, MethodKind};

use crate::batch::{BatchOutcome, BatchRunner};
use crate::cli::CliTransport;
use crate::error::{DeviceError, DeviceResult};
use crate::netconf::NetconfTransport;
use crate::structured::StructuredConfig;
use crate::types::DeviceTarget;

/// Scripted [`StructuredConfig`] that records every call.
pub struct MockStructuredConfig {
    method: MethodKind,
    /// Reply per operation. `Err` text becomes `DeviceError::Other`.
    replies: Mutex<HashMap<ActionKind, Result<String, String>>>,
    /// `(operation, host)` for each call.
    calls: Mutex<Vec<(ActionKind, String)>>,
}

impl MockStructuredConfig {
    pub fn new(method: MethodKind) -> Self {
        Self {
            method,
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the prose returned for `action`.
    pub fn set_reply(&self, action: ActionKind, text: impl Into<String>) {
        self.replies.lock().unwrap().insert(action, Ok(text.into()));
    }

    /// Script a device error for `action`.
    pub fn set_error(&self, action: ActionKind, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .insert(action, Err(message.into()));
    }

    pub fn calls(&self) -> Vec<(ActionKind, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn answer(&self, action: ActionKind, target: &DeviceTarget) -> DeviceResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((action, target.host.clone()));
        match self.replies.lock().unwrap().get(&action) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(DeviceError::Other(message.clone())),
            None => Err(DeviceError::Other(format!("no scripted reply for {action}"))),
        }
    }
}

#[async_trait]
impl StructuredConfig for MockStructuredConfig {
    fn method(&self) -> MethodKind {
        self.method
    }

    async fn create(&self, target: &DeviceTarget) -> DeviceResult<String> {
        self.answer(ActionKind::Create, target)
    }

    async fn delete(&self, target: &DeviceTarget) -> DeviceResult<String> {
        self.answer(ActionKind::Delete, target)
    }

    async fn enable(&self, target: &DeviceTarget) -> DeviceResult<String> {
        self.answer(ActionKind::Enable, target)
    }

    async fn disable(&self, target: &DeviceTarget) -> DeviceResult<String> {
        self.answer(ActionKind::Disable, target)
    }

    async fn status(&self, target: &DeviceTarget) -> DeviceResult<String> {
        self.answer(ActionKind::Status, target)
    }
}

/// [`NetconfTransport`] replaying queued replies (FIFO).
pub struct MockNetconfTransport {
    replies: Mutex<VecDeque<Result<String, String>>>,
    /// `(host, operation)` for each RPC.
    requests: Mutex<Vec<(String, String)>>,
}

impl MockNetconfTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockNetconfTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetconfTransport for MockNetconfTransport {
    async fn rpc(&self, target: &DeviceTarget, operation: &str) -> DeviceResult<String> {
        self.requests
            .lock()
            .unwrap()
            .push((target.host.clone(), operation.to_string()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(DeviceError::Netconf(message)),
            None => Err(DeviceError::Netconf("no queued reply".into())),
        }
    }
}

/// [`CliTransport`] answering from a command → output table.
///
/// Unknown commands return empty output, like a device that printed nothing.
pub struct MockCliTransport {
    outputs: Mutex<HashMap<String, String>>,
    failure: Mutex<Option<String>>,
    commands: Mutex<Vec<String>>,
}

impl MockCliTransport {
    pub fn new() -> Self {
        Self {
            outputs: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn set_output(&self, command: &str, output: &str) {
        self.outputs
            .lock()
            .unwrap()
            .insert(command.to_string(), output.to_string());
    }

    /// Make every subsequent command fail with an SSH error.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl Default for MockCliTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CliTransport for MockCliTransport {
    async fn run(&self, _target: &DeviceTarget, command: &str) -> DeviceResult<String> {
        self.commands.lock().unwrap().push(command.to_string());
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(DeviceError::Ssh(message));
        }
        Ok(self
            .outputs
            .lock()
            .unwrap()
            .get(command)
            .cloned()
            .unwrap_or_default())
    }
}

/// A recorded [`BatchRunner`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchCall {
    FetchConfig { host: String },
    WriteBanner { host: String, text: String },
}

/// Scripted [`BatchRunner`].
pub struct MockBatchRunner {
    fetch_outcome: Mutex<BatchOutcome>,
    write_outcome: Mutex<BatchOutcome>,
    calls: Mutex<Vec<BatchCall>>,
}

impl MockBatchRunner {
    /// Both operations succeed; fetch reports a path that does not exist.
    pub fn new() -> Self {
        Self {
            fetch_outcome: Mutex::new(BatchOutcome::Success("show_run.txt".into())),
            write_outcome: Mutex::new(BatchOutcome::Success(
                nb_protocol::BANNER_WRITTEN.into(),
            )),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_fetch_outcome(&self, outcome: BatchOutcome) {
        *self.fetch_outcome.lock().unwrap() = outcome;
    }

    pub fn set_write_outcome(&self, outcome: BatchOutcome) {
        *self.write_outcome.lock().unwrap() = outcome;
    }

    pub fn calls(&self) -> Vec<BatchCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockBatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchRunner for MockBatchRunner {
    async fn fetch_config(&self, target: &DeviceTarget) -> BatchOutcome {
        self.calls.lock().unwrap().push(BatchCall::FetchConfig {
            host: target.host.clone(),
        });
        self.fetch_outcome.lock().unwrap().clone()
    }

    async fn write_banner(&self, target: &DeviceTarget, text: &str) -> BatchOutcome {
        self.calls.lock().unwrap().push(BatchCall::WriteBanner {
            host: target.host.clone(),
            text: text.to_string(),
        });
        self.write_outcome.lock().unwrap().clone()
    }
}
