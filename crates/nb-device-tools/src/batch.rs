//! Batch-runner adapter: Ansible for running-config dumps and banner writes.
//!
//! Programs run through `tokio::process::Command` directly (no shell), with a
//! timeout and capped output. Process details never leave this module: the
//! dispatcher only sees a [`BatchOutcome`].

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nb_protocol::BANNER_WRITTEN;
use serde::Deserialize;
use tokio::process::Command;

use crate::types::DeviceTarget;

/// Maximum diagnostic size kept from a failed run (64 KB).
const MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Result of one batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// For `fetch_config`, the path of the written file.
    Success(String),
    Failure { reason: String, diagnostic: String },
}

impl BatchOutcome {
    pub fn failure(reason: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        BatchOutcome::Failure {
            reason: reason.into(),
            diagnostic: diagnostic.into(),
        }
    }
}

/// Playbook-style operations against one device.
#[async_trait]
pub trait BatchRunner: Send + Sync {
    /// Dump the running configuration to a local file.
    async fn fetch_config(&self, target: &DeviceTarget) -> BatchOutcome;

    /// Set the MOTD banner.
    async fn write_banner(&self, target: &DeviceTarget, text: &str) -> BatchOutcome;
}

/// `[ansible]` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct AnsibleConfig {
    #[serde(default = "default_ansible_program")]
    pub ansible_program: String,
    #[serde(default = "default_playbook_program")]
    pub playbook_program: String,
    #[serde(default = "default_inventory")]
    pub inventory: PathBuf,
    #[serde(default = "default_showrun_playbook")]
    pub showrun_playbook: PathBuf,
    /// Where running-config dumps are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ansible_program() -> String {
    "ansible".into()
}

fn default_playbook_program() -> String {
    "ansible-playbook".into()
}

fn default_inventory() -> PathBuf {
    PathBuf::from("inventory.ini")
}

fn default_showrun_playbook() -> PathBuf {
    PathBuf::from("playbook_showrun.yml")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for AnsibleConfig {
    fn default() -> Self {
        Self {
            ansible_program: default_ansible_program(),
            playbook_program: default_playbook_program(),
            inventory: default_inventory(),
            showrun_playbook: default_showrun_playbook(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// [`BatchRunner`] that shells out to `ansible` / `ansible-playbook`.
pub struct AnsibleRunner {
    config: AnsibleConfig,
    session_id: String,
}

impl AnsibleRunner {
    pub fn new(config: AnsibleConfig, session_id: impl Into<String>) -> Self {
        Self {
            config,
            session_id: session_id.into(),
        }
    }

    /// `<output_dir>/show_run_<session>_<host>.txt`
    pub fn output_path(&self, target: &DeviceTarget) -> PathBuf {
        self.config
            .output_dir
            .join(format!("show_run_{}_{}.txt", self.session_id, target.host))
    }

    /// Run a program to completion. `Ok(stdout)` on exit 0, otherwise the
    /// failure to report.
    async fn run(&self, program: &str, args: &[String]) -> Result<String, BatchOutcome> {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        tracing::info!(program, args = ?args, "starting batch run");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BatchOutcome::failure(format!("failed to start {program}"), e.to_string()))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(BatchOutcome::failure(
                    format!("{program} did not complete"),
                    e.to_string(),
                ));
            }
            Err(_) => {
                return Err(BatchOutcome::failure(
                    format!("{program} timed out after {}s", timeout.as_secs()),
                    String::new(),
                ));
            }
        };

        let stdout = capped(&output.stdout);
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = capped(&output.stderr);
        let reason = match output.status.code() {
            Some(code) => format!("ansible exited with code {code}"),
            None => "ansible terminated by signal".to_string(),
        };
        let diagnostic = if stderr.trim().is_empty() {
            stdout
        } else {
            stderr
        };
        tracing::warn!(program, reason = %reason, "batch run failed");
        Err(BatchOutcome::Failure { reason, diagnostic })
    }
}

fn capped(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() > MAX_OUTPUT_BYTES {
        let mut cut = MAX_OUTPUT_BYTES;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("\n... [output truncated at 64KB]");
    }
    text
}

#[async_trait]
impl BatchRunner for AnsibleRunner {
    async fn fetch_config(&self, target: &DeviceTarget) -> BatchOutcome {
        let output_file = self.output_path(target);
        match tokio::fs::remove_file(&output_file).await {
            Ok(()) => tracing::debug!(path = %output_file.display(), "removed stale output file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return BatchOutcome::failure(
                    "cannot clear previous output file",
                    format!("{}: {e}", output_file.display()),
                );
            }
        }

        let args = vec![
            "-i".to_string(),
            self.config.inventory.display().to_string(),
            self.config.showrun_playbook.display().to_string(),
            "-e".to_string(),
            format!("target_host={}", target.host),
            "-e".to_string(),
            format!("output_file={}", output_file.display()),
        ];

        match self.run(&self.config.playbook_program, &args).await {
            Ok(_) if output_file.is_file() => {
                BatchOutcome::Success(output_file.display().to_string())
            }
            Ok(stdout) => BatchOutcome::failure("playbook produced no output file", stdout),
            Err(failure) => failure,
        }
    }

    async fn write_banner(&self, target: &DeviceTarget, text: &str) -> BatchOutcome {
        let module_args = format!(
            "banner=motd text={} state=present",
            shell_words::quote(text)
        );
        let args = vec![
            "-i".to_string(),
            self.config.inventory.display().to_string(),
            target.host.clone(),
            "-m".to_string(),
            "cisco.ios.ios_banner".to_string(),
            "-a".to_string(),
            module_args,
        ];

        match self.run(&self.config.ansible_program, &args).await {
            Ok(_) => BatchOutcome::Success(BANNER_WRITTEN.to_string()),
            Err(failure) => failure,
        }
    }
}
