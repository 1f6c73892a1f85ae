//! Command dispatcher: routes parsed commands to device adapters and maps
//! their results onto the chat reply vocabulary.
//!
//! - method selection and parse errors are answered directly
//! - loopback operations require a selected method and go to the matching
//!   `StructuredConfig` adapter
//! - banner, running-config and GigabitEthernet commands are method-exempt
//!   and go to the CLI scraper or batch runner

use std::path::Path;

use nb_device_tools::{
    BatchOutcome, BatchRunner, CliScrape, Credentials, DeviceError, DeviceTarget,
    StructuredConfig,
};
use nb_protocol::{
    ActionKind, BANNER_WRITTEN, DeviceAddr, MethodKind, NO_COMMAND, NO_METHOD, NO_MOTD_TEXT,
    ParsedCommand, RUNNING_CONFIG_CAPTION, Reply, checked_by, method_selected, using,
};

use crate::parser;
use crate::session::Session;

/// Dispatches commands for one chat session.
///
/// Generic over adapters through trait objects for testability.
pub struct CommandDispatcher<'a> {
    restconf: &'a dyn StructuredConfig,
    netconf: &'a dyn StructuredConfig,
    cli: &'a dyn CliScrape,
    batch: &'a dyn BatchRunner,
    credentials: Credentials,
    session_id: String,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(
        restconf: &'a dyn StructuredConfig,
        netconf: &'a dyn StructuredConfig,
        cli: &'a dyn CliScrape,
        batch: &'a dyn BatchRunner,
        credentials: Credentials,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            restconf,
            netconf,
            cli,
            batch,
            credentials,
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Parse and dispatch one chat line. `None` when the line is not
    /// addressed to this session.
    pub async fn handle_text(&self, session: &mut Session, text: &str) -> Option<Reply> {
        let command = parser::parse(text, &self.session_id)?;
        Some(self.dispatch(session, command).await)
    }

    /// Produce exactly one reply for a parsed command.
    pub async fn dispatch(&self, session: &mut Session, command: ParsedCommand) -> Reply {
        match command {
            ParsedCommand::SelectMethod(method) => {
                session.set_method(method);
                tracing::info!(method = %method, "method selected");
                Reply::text(method_selected(method))
            }
            ParsedCommand::Empty => Reply::text(NO_METHOD),
            ParsedCommand::IpOnly(_) => Reply::text(NO_COMMAND),
            ParsedCommand::Malformed(err) => {
                tracing::debug!(error = ?err, "malformed command");
                Reply::text(err.to_string())
            }
            ParsedCommand::DeviceAction { device, action } => match action {
                ActionKind::BulkConfigFetch => self.fetch_config(session, device).await,
                ActionKind::GigabitStatus => self.gigabit_status(session, device).await,
                ActionKind::Create
                | ActionKind::Delete
                | ActionKind::Enable
                | ActionKind::Disable
                | ActionKind::Status => self.structured_action(session, device, action).await,
            },
            ParsedCommand::BannerAction { device, text } => {
                self.banner(session, device, text).await
            }
        }
    }

    fn adapter(&self, method: MethodKind) -> &'a dyn StructuredConfig {
        match method {
            MethodKind::Restconf => self.restconf,
            MethodKind::Netconf => self.netconf,
        }
    }

    fn target(&self, session: &mut Session, device: DeviceAddr) -> DeviceTarget {
        let target = DeviceTarget::for_addr(&device, &self.credentials);
        session.set_last_ip(device);
        target
    }

    async fn structured_action(
        &self,
        session: &mut Session,
        device: DeviceAddr,
        action: ActionKind,
    ) -> Reply {
        let Some(method) = session.method() else {
            tracing::info!(action = %action, "rejected: no method selected");
            return Reply::text(NO_METHOD);
        };
        let adapter = self.adapter(method);
        let target = self.target(session, device);
        tracing::info!(device = %target.host, action = %action, method = %method, "dispatching");

        let result = match action {
            ActionKind::Create => adapter.create(&target).await,
            ActionKind::Delete => adapter.delete(&target).await,
            ActionKind::Enable => adapter.enable(&target).await,
            ActionKind::Disable => adapter.disable(&target).await,
            ActionKind::Status => adapter.status(&target).await,
            ActionKind::BulkConfigFetch | ActionKind::GigabitStatus => Err(DeviceError::Other(
                format!("{action} is not a loopback operation"),
            )),
        };

        let message = result.unwrap_or_else(|e| {
            tracing::warn!(device = %target.host, action = %action, error = %e, "adapter failed");
            format!("Error executing {action}: {e}")
        });
        Reply::text(compose(action, method, &message))
    }

    async fn fetch_config(&self, session: &mut Session, device: DeviceAddr) -> Reply {
        let target = self.target(session, device);
        tracing::info!(device = %target.host, "fetching running config");

        match self.batch.fetch_config(&target).await {
            BatchOutcome::Success(path) if Path::new(&path).is_file() => {
                Reply::file(RUNNING_CONFIG_CAPTION, path)
            }
            BatchOutcome::Success(text) => Reply::text(text),
            BatchOutcome::Failure { reason, diagnostic } => {
                Reply::text(batch_error(&reason, &diagnostic))
            }
        }
    }

    async fn gigabit_status(&self, session: &mut Session, device: DeviceAddr) -> Reply {
        let target = self.target(session, device);
        match self.cli.gigabit_status(&target).await {
            Ok(summary) => Reply::text(summary),
            Err(e) => Reply::text(format!(
                "Error executing {}: {e}",
                ActionKind::GigabitStatus
            )),
        }
    }

    async fn banner(&self, session: &mut Session, device: DeviceAddr, text: Option<String>) -> Reply {
        let target = self.target(session, device);

        let Some(text) = text else {
            return Reply::text(self.cli.read_banner(&target).await);
        };
        let text = text.trim();
        if text.is_empty() {
            return Reply::text(NO_MOTD_TEXT);
        }

        tracing::info!(device = %target.host, "writing banner");
        match self.batch.write_banner(&target, text).await {
            BatchOutcome::Success(_) => Reply::text(BANNER_WRITTEN),
            BatchOutcome::Failure { reason, diagnostic } => {
                Reply::text(batch_error(&reason, &diagnostic))
            }
        }
    }
}

/// Decorate adapter prose with the method that produced it.
///
/// Success detection is a case-insensitive substring match on the prose.
fn compose(action: ActionKind, method: MethodKind, message: &str) -> String {
    let lower = message.to_lowercase();
    match action {
        ActionKind::Status => checked_by(message, method),
        _ if lower.contains("successfully") => using(message, method),
        ActionKind::Disable if lower.contains("cannot") || lower.contains("not found") => {
            checked_by(message, method)
        }
        _ => message.to_string(),
    }
}

fn batch_error(reason: &str, diagnostic: &str) -> String {
    format!("Error: {reason}\n{diagnostic}")
}
