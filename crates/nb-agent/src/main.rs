//! netbot agent: chat-driven router for a lab network device.
//!
//! Wires the Webex room, the structured-config adapters (RESTCONF and
//! NETCONF), the CLI scraper and the Ansible runner into a single polling
//! process.

use tracing_subscriber::EnvFilter;

use nb_agent::config::AgentConfig;
use nb_agent::dispatcher::CommandDispatcher;
use nb_agent::poll_loop;
use nb_agent::session::Session;
use nb_chat_channel::WebexChannel;
use nb_device_tools::{
    AnsibleRunner, CliScraper, LoopbackSpec, NetconfClient, RestconfClient, SshCliTransport,
    SshNetconfTransport,
};
use nb_protocol::DeviceAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "nb-agent starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/netbot/agent.toml".to_string());

    let mut config = AgentConfig::load(&config_path)?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    tracing::info!(
        session_id = %config.session_id,
        room_id = %config.webex.room_id,
        default_host = ?config.device.default_host,
        "config loaded"
    );

    // ── Device adapters ─────────────────────────────────────────
    let loopback = LoopbackSpec::for_student(&config.session_id);
    let timeout = config.device.timeout();

    let restconf = RestconfClient::new(config.restconf_config(), loopback.clone())?;
    let netconf = NetconfClient::new(
        SshNetconfTransport::new(config.device.netconf_port, timeout),
        loopback,
    );
    let cli = CliScraper::new(SshCliTransport::new(config.device.ssh_port, timeout));
    let batch = AnsibleRunner::new(config.ansible.clone(), config.session_id.clone());

    let dispatcher = CommandDispatcher::new(
        &restconf,
        &netconf,
        &cli,
        &batch,
        config.credentials(),
        config.session_id.clone(),
    );

    // ── Chat channel ────────────────────────────────────────────
    let channel = WebexChannel::new(config.webex.clone())?;

    let default_host = config.device.default_host.as_deref().and_then(|host| {
        let addr = DeviceAddr::parse(host);
        if addr.is_none() {
            tracing::warn!(host, "default_host is not a dotted quad, ignoring");
        }
        addr
    });
    let mut session = Session::with_last_ip(default_host);

    tracing::info!("nb-agent ready");

    tokio::select! {
        () = poll_loop::run(&channel, &dispatcher, &mut session, config.poll_interval()) => {
            tracing::error!("poll loop exited unexpectedly");
        }
        // Graceful shutdown on SIGINT
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("nb-agent stopped");
    Ok(())
}
