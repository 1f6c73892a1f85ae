//! SSH transports built on russh.
//!
//! One connection per call: connect, password auth, open a session channel,
//! run one exchange, disconnect. Lab devices are reached by address only and
//! their host keys are not pinned.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg};

use crate::cli::CliTransport;
use crate::error::{DeviceError, DeviceResult};
use crate::netconf::{self, NetconfTransport};
use crate::types::DeviceTarget;

/// Cap on bytes collected from one channel.
const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Accepts every server key.
struct LabHostKeys;

impl client::Handler for LabHostKeys {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

async fn connect(
    target: &DeviceTarget,
    port: u16,
    timeout: Duration,
) -> DeviceResult<Handle<LabHostKeys>> {
    let config = Arc::new(client::Config {
        inactivity_timeout: Some(timeout),
        ..Default::default()
    });

    let mut session = tokio::time::timeout(
        timeout,
        client::connect(config, (target.host.as_str(), port), LabHostKeys),
    )
    .await
    .map_err(|_| DeviceError::Timeout {
        secs: timeout.as_secs(),
    })??;

    let creds = &target.credentials;
    let authenticated = session
        .authenticate_password(&creds.username, &creds.password)
        .await?
        .success();
    if !authenticated {
        return Err(DeviceError::AuthenticationFailed {
            user: creds.username.clone(),
        });
    }

    tracing::debug!(host = %target.host, port, "ssh session established");
    Ok(session)
}

async fn close(session: Handle<LabHostKeys>) {
    if let Err(e) = session
        .disconnect(russh::Disconnect::ByApplication, "", "en")
        .await
    {
        tracing::debug!(error = %e, "ssh disconnect failed");
    }
}

/// Read until `done` says the buffer is complete, the channel closes, or the
/// cap is hit.
async fn read_until<F>(channel: &mut Channel<client::Msg>, done: F) -> DeviceResult<Vec<u8>>
where
    F: Fn(&[u8]) -> bool,
{
    let mut buf = Vec::new();
    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { ref data } | ChannelMsg::ExtendedData { ref data, .. } => {
                buf.extend_from_slice(data);
                if buf.len() >= MAX_OUTPUT_BYTES {
                    buf.truncate(MAX_OUTPUT_BYTES);
                    break;
                }
                if done(&buf) {
                    break;
                }
            }
            ChannelMsg::Eof | ChannelMsg::Close => break,
            _ => {}
        }
    }
    Ok(buf)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// CLI commands over an SSH exec channel.
pub struct SshCliTransport {
    port: u16,
    timeout: Duration,
}

impl SshCliTransport {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }
}

impl Default for SshCliTransport {
    fn default() -> Self {
        Self::new(22, Duration::from_secs(20))
    }
}

#[async_trait]
impl CliTransport for SshCliTransport {
    async fn run(&self, target: &DeviceTarget, command: &str) -> DeviceResult<String> {
        let session = connect(target, self.port, self.timeout).await?;

        let exchange = async {
            let mut channel = session.channel_open_session().await?;
            channel.exec(true, command).await?;
            let out = read_until(&mut channel, |_| false).await?;
            Ok::<_, DeviceError>(String::from_utf8_lossy(&out).into_owned())
        };
        let result = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| DeviceError::Timeout {
                secs: self.timeout.as_secs(),
            })
            .and_then(|r| r);

        close(session).await;
        tracing::debug!(host = %target.host, command, ok = result.is_ok(), "cli command");
        result
    }
}

/// NETCONF 1.0 over the SSH `netconf` subsystem.
pub struct SshNetconfTransport {
    port: u16,
    timeout: Duration,
}

impl SshNetconfTransport {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    async fn send_frame(channel: &Channel<client::Msg>, xml: &str) -> DeviceResult<()> {
        let frame = format!("{xml}\n{}\n", netconf::FRAME_END);
        channel.data(frame.as_bytes()).await?;
        Ok(())
    }

    async fn recv_frame(channel: &mut Channel<client::Msg>) -> DeviceResult<String> {
        let end = netconf::FRAME_END.as_bytes();
        let buf = read_until(channel, |b| contains(b, end)).await?;
        let text = String::from_utf8_lossy(&buf);
        match text.find(netconf::FRAME_END) {
            Some(pos) => Ok(text[..pos].trim().to_string()),
            None => Err(DeviceError::Netconf(
                "channel closed before end of message".into(),
            )),
        }
    }
}

impl Default for SshNetconfTransport {
    fn default() -> Self {
        Self::new(830, Duration::from_secs(20))
    }
}

#[async_trait]
impl NetconfTransport for SshNetconfTransport {
    async fn rpc(&self, target: &DeviceTarget, operation: &str) -> DeviceResult<String> {
        let session = connect(target, self.port, self.timeout).await?;

        let exchange = async {
            let mut channel = session.channel_open_session().await?;
            channel.request_subsystem(true, "netconf").await?;

            let server_hello = Self::recv_frame(&mut channel).await?;
            if !netconf::is_hello(&server_hello)? {
                return Err(DeviceError::Netconf("server did not send hello".into()));
            }
            Self::send_frame(&channel, netconf::HELLO).await?;

            Self::send_frame(&channel, &netconf::wrap_rpc(101, operation)).await?;
            let reply = Self::recv_frame(&mut channel).await?;

            Self::send_frame(&channel, &netconf::wrap_rpc(102, netconf::CLOSE_SESSION)).await?;
            Ok::<_, DeviceError>(reply)
        };
        let result = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| DeviceError::Timeout {
                secs: self.timeout.as_secs(),
            })
            .and_then(|r| r);

        close(session).await;
        tracing::debug!(host = %target.host, ok = result.is_ok(), "netconf rpc");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credentials;

    #[test]
    fn byte_search() {
        assert!(contains(b"<ok/></rpc-reply>]]>]]>", b"]]>]]>"));
        assert!(!contains(b"<ok/></rpc-reply>]]>", b"]]>]]>"));
    }

    #[tokio::test]
    async fn unreachable_host_is_err() {
        let transport = SshCliTransport::new(1, Duration::from_secs(2));
        let target = DeviceTarget::new("127.0.0.1", Credentials::new("admin", "cisco"));
        assert!(transport.run(&target, "show version").await.is_err());
    }

    #[tokio::test]
    async fn netconf_unreachable_host_is_err() {
        let transport = SshNetconfTransport::new(1, Duration::from_secs(2));
        let target = DeviceTarget::new("127.0.0.1", Credentials::new("admin", "cisco"));
        assert!(transport.rpc(&target, "<get/>").await.is_err());
    }
}
