//! Agent configuration, loadable from TOML and overridden from the
//! environment.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use nb_chat_channel::WebexConfig;
use nb_device_tools::{AnsibleConfig, Credentials, RestconfConfig};
use serde::Deserialize;

/// Top-level configuration for the agent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentConfig {
    /// Session id: the `/<id>` command prefix and the loopback number.
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub webex: WebexConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub ansible: AnsibleConfig,
}

/// `[device]` section: how to reach and log in to routers.
#[derive(Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Seeds the session's last-addressed device.
    #[serde(default)]
    pub default_host: Option<String>,
    #[serde(default = "default_restconf_scheme")]
    pub restconf_scheme: String,
    #[serde(default)]
    pub restconf_port: Option<u16>,
    #[serde(default = "default_netconf_port")]
    pub netconf_port: u16,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    /// Bound on every device exchange, per request or per session.
    #[serde(default = "default_device_timeout")]
    pub timeout_secs: u64,
}

fn default_restconf_scheme() -> String {
    "https".into()
}

fn default_netconf_port() -> u16 {
    830
}

fn default_ssh_port() -> u16 {
    22
}

fn default_device_timeout() -> u64 {
    20
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            default_host: None,
            restconf_scheme: default_restconf_scheme(),
            restconf_port: None,
            netconf_port: default_netconf_port(),
            ssh_port: default_ssh_port(),
            timeout_secs: default_device_timeout(),
        }
    }
}

impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("default_host", &self.default_host)
            .field("restconf_scheme", &self.restconf_scheme)
            .field("restconf_port", &self.restconf_port)
            .field("netconf_port", &self.netconf_port)
            .field("ssh_port", &self.ssh_port)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AgentConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// built-in defaults so the agent can run from environment alone.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path, "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("STUDENT_ID") {
            self.session_id = v;
        }
        if let Some(v) = get("WEBEX_BOT_TOKEN") {
            self.webex.access_token = v;
        }
        if let Some(v) = get("WEBEX_ROOM_ID") {
            self.webex.room_id = v;
        }
        if let Some(v) = get("ROUTER_USER") {
            self.device.username = v;
        }
        if let Some(v) = get("ROUTER_PASS") {
            self.device.password = v;
        }
        if let Some(v) = get("ROUTER_IP") {
            self.device.default_host = Some(v);
        }
    }

    /// Reject configurations the agent cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session_id.trim().is_empty() {
            anyhow::bail!("session_id is not set (config file or STUDENT_ID)");
        }
        if self.webex.room_id.trim().is_empty() {
            anyhow::bail!("webex.room_id is not set (config file or WEBEX_ROOM_ID)");
        }
        if self.webex.access_token.trim().is_empty() {
            anyhow::bail!("webex.access_token is not set (config file or WEBEX_BOT_TOKEN)");
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.device.username, &self.device.password)
    }

    pub fn restconf_config(&self) -> RestconfConfig {
        RestconfConfig {
            scheme: self.device.restconf_scheme.clone(),
            port: self.device.restconf_port,
            timeout_secs: self.device.timeout_secs,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.webex.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn deserialize_minimal_config() {
        let toml = r#"
session_id = "66070123"

[webex]
room_id = "room-1"
access_token = "token"
"#;
        let config: AgentConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.session_id, "66070123");
        assert_eq!(config.webex.api_base, "https://webexapis.com/v1"); // default
        assert_eq!(config.webex.poll_interval_secs, 1); // default
        assert_eq!(config.device.netconf_port, 830);
        assert_eq!(config.device.ssh_port, 22);
        assert_eq!(config.device.restconf_scheme, "https");
        assert_eq!(config.ansible.playbook_program, "ansible-playbook");
        assert!(config.device.default_host.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
session_id = "66070205"

[webex]
api_base = "http://localhost:9000/v1"
room_id = "room-2"
access_token = "token"
poll_interval_secs = 3

[device]
username = "admin"
password = "cisco"
default_host = "10.0.15.61"
restconf_scheme = "http"
restconf_port = 8080
netconf_port = 2830
ssh_port = 2222
timeout_secs = 5

[ansible]
inventory = "/etc/netbot/inventory.ini"
showrun_playbook = "/etc/netbot/showrun.yml"
output_dir = "/var/lib/netbot"
timeout_secs = 60
"#;
        let config: AgentConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.device.default_host.as_deref(), Some("10.0.15.61"));
        assert_eq!(config.device.timeout(), Duration::from_secs(5));
        assert_eq!(config.restconf_config().port, Some(8080));
        assert_eq!(config.restconf_config().scheme, "http");
        assert_eq!(config.credentials().username, "admin");
        assert_eq!(config.ansible.timeout_secs, 60);
        assert_eq!(
            config.ansible.output_dir,
            std::path::PathBuf::from("/var/lib/netbot")
        );
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config: AgentConfig = toml::from_str(
            r#"
session_id = "from-file"
[device]
username = "file-user"
"#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            ("STUDENT_ID", "66070123"),
            ("WEBEX_BOT_TOKEN", "env-token"),
            ("WEBEX_ROOM_ID", "env-room"),
            ("ROUTER_PASS", "env-pass"),
            ("ROUTER_IP", "10.0.15.62"),
            ("ROUTER_USER", ""),
        ]
        .into_iter()
        .collect();

        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.session_id, "66070123");
        assert_eq!(config.webex.access_token, "env-token");
        assert_eq!(config.webex.room_id, "env-room");
        assert_eq!(config.device.username, "file-user"); // empty env ignored
        assert_eq!(config.device.password, "env-pass");
        assert_eq!(config.device.default_host.as_deref(), Some("10.0.15.62"));
    }

    #[test]
    fn validate_rejects_missing_required_fields() {
        let mut config = AgentConfig::default();
        assert!(config.validate().is_err());

        config.session_id = "66070123".into();
        assert!(config.validate().unwrap_err().to_string().contains("room_id"));

        config.webex.room_id = "room".into();
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("access_token"));

        config.webex.access_token = "token".into();
        config.validate().unwrap();
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let config = AgentConfig::load("/nonexistent/netbot/agent.toml").unwrap();
        assert!(config.session_id.is_empty());
        assert_eq!(config.device.netconf_port, 830);
    }

    #[test]
    fn load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "session_id = \"66070123\"\n").unwrap();

        let config = AgentConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.session_id, "66070123");
    }

    #[test]
    fn debug_hides_password() {
        let mut config = AgentConfig::default();
        config.device.password = "cisco".into();
        assert!(!format!("{config:?}").contains("cisco"));
    }
}
