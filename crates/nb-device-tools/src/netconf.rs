//! NETCONF adapter (ietf-interfaces over NETCONF 1.0).
//!
//! The adapter builds `<edit-config>` and `<get>` operations and hands them
//! to a [`NetconfTransport`], which owns session setup and framing. The SSH
//! implementation lives in `ssh.rs`; tests use `MockNetconfTransport`.

use async_trait::async_trait;
use nb_protocol::MethodKind;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{DeviceError, DeviceResult};
use crate::messages::{self, LoopbackOp};
use crate::structured::StructuredConfig;
use crate::types::{DeviceTarget, LoopbackSpec};

pub const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";
const IF_NS: &str = "urn:ietf:params:xml:ns:yang:ietf-interfaces";

/// NETCONF 1.0 end-of-message marker.
pub const FRAME_END: &str = "]]>]]>";

/// Client hello advertising base 1.0 only, so the server keeps end-of-message
/// framing for the whole session.
pub const HELLO: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">"#,
    "<capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities>",
    "</hello>"
);

pub const CLOSE_SESSION: &str = "<close-session/>";

/// Exchanges one RPC with a device.
///
/// `operation` is the body of the `<rpc>` element. Implementations wrap it,
/// send it and return the raw `<rpc-reply>` document. A returned `Err` means
/// no reply was obtained; an `<rpc-error>` reply is still `Ok`.
#[async_trait]
pub trait NetconfTransport: Send + Sync {
    async fn rpc(&self, target: &DeviceTarget, operation: &str) -> DeviceResult<String>;
}

/// Wrap an operation in an `<rpc>` envelope.
pub fn wrap_rpc(message_id: u32, operation: &str) -> String {
    format!(r#"<rpc message-id="{message_id}" xmlns="{BASE_NS}">{operation}</rpc>"#)
}

// ── Reply parsing ─────────────────────────────────────────────

enum Node<'a> {
    /// Start or empty tag; the path ends with its local name.
    Element(&'a [String]),
    /// Trimmed text inside the element at the end of the path.
    Text(&'a [String], &'a str),
}

/// Walk a document, reporting elements by their path of local names.
/// Namespace prefixes are dropped; comments and declarations are skipped.
fn walk<F>(document: &str, mut visit: F) -> DeviceResult<()>
where
    F: FnMut(Node<'_>),
{
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                visit(Node::Element(&path));
            }
            Ok(Event::Empty(e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                visit(Node::Element(&path));
                path.pop();
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(t)) => {
                let text = String::from_utf8_lossy(&t);
                visit(Node::Text(&path, text.trim()));
            }
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(e) => {
                return Err(DeviceError::Decode(format!(
                    "malformed netconf document at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }
}

fn ends_with(path: &[String], tail: &[&str]) -> bool {
    path.len() >= tail.len()
        && path[path.len() - tail.len()..]
            .iter()
            .zip(tail)
            .all(|(a, b)| a == b)
}

fn is_path(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && ends_with(path, expected)
}

fn parent(path: &[String]) -> &[String] {
    &path[..path.len().saturating_sub(1)]
}

/// True when the reply carries `<ok/>` directly under `<rpc-reply>`.
pub fn reply_is_ok(reply: &str) -> DeviceResult<bool> {
    let mut ok = false;
    walk(reply, |node| {
        if let Node::Element(path) = node {
            ok |= is_path(path, &["rpc-reply", "ok"]);
        }
    })?;
    Ok(ok)
}

/// True when the document's root element is `<hello>`.
pub fn is_hello(document: &str) -> DeviceResult<bool> {
    let mut hello = false;
    walk(document, |node| {
        if let Node::Element(path) = node {
            hello |= is_path(path, &["hello"]);
        }
    })?;
    Ok(hello)
}

/// Admin and operational state read from an interfaces-state reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceState {
    pub name: String,
    pub admin_status: String,
    pub oper_status: String,
}

impl InterfaceState {
    pub fn is_up(&self) -> bool {
        self.admin_status.eq_ignore_ascii_case("up") && self.oper_status.eq_ignore_ascii_case("up")
    }
}

/// Find the named interface under `interfaces-state` in a `<get>` reply.
pub fn parse_interface_state(reply: &str, name: &str) -> DeviceResult<Option<InterfaceState>> {
    let mut interfaces: Vec<InterfaceState> = Vec::new();
    walk(reply, |node| match node {
        Node::Element(path) if ends_with(path, &["interfaces-state", "interface"]) => {
            interfaces.push(InterfaceState::default());
        }
        Node::Text(path, text) if ends_with(parent(path), &["interfaces-state", "interface"]) => {
            let Some(current) = interfaces.last_mut() else {
                return;
            };
            match path.last().map(String::as_str) {
                Some("name") => current.name = text.to_string(),
                Some("admin-status") => current.admin_status = text.to_lowercase(),
                Some("oper-status") => current.oper_status = text.to_lowercase(),
                _ => {}
            }
        }
        _ => {}
    })?;
    Ok(interfaces.into_iter().find(|i| i.name == name))
}

/// Structured-config adapter B.
pub struct NetconfClient<T> {
    transport: T,
    loopback: LoopbackSpec,
}

impl<T: NetconfTransport> NetconfClient<T> {
    pub fn new(transport: T, loopback: LoopbackSpec) -> Self {
        Self {
            transport,
            loopback,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn edit_config(
        &self,
        target: &DeviceTarget,
        op: LoopbackOp,
        config: String,
    ) -> DeviceResult<String> {
        let operation = format!(
            "<edit-config><target><running/></target><config>{config}</config></edit-config>"
        );
        let reply = self.transport.rpc(target, &operation).await?;
        let id = &self.loopback.student_id;
        if reply_is_ok(&reply)? {
            Ok(messages::succeeded(op, id))
        } else {
            tracing::warn!(
                operation = op.verb(),
                device = %target.host,
                "edit-config rejected by device"
            );
            Ok(messages::cannot(op, id))
        }
    }

    fn enabled_config(&self, enabled: bool) -> String {
        format!(
            r#"<interfaces xmlns="{IF_NS}"><interface><name>{}</name><enabled>{enabled}</enabled></interface></interfaces>"#,
            self.loopback.name
        )
    }
}

#[async_trait]
impl<T: NetconfTransport> StructuredConfig for NetconfClient<T> {
    fn method(&self) -> MethodKind {
        MethodKind::Netconf
    }

    async fn create(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let lo = &self.loopback;
        let config = format!(
            concat!(
                r#"<interfaces xmlns="{ns}" xmlns:ianaift="urn:ietf:params:xml:ns:yang:iana-if-type">"#,
                "<interface><name>{name}</name><description>{desc}</description>",
                "<type>ianaift:softwareLoopback</type><enabled>true</enabled>",
                r#"<ipv4 xmlns="urn:ietf:params:xml:ns:yang:ietf-ip"><address>"#,
                "<ip>{ip}</ip><netmask>{mask}</netmask>",
                "</address></ipv4></interface></interfaces>"
            ),
            ns = IF_NS,
            name = lo.name,
            desc = lo.description(),
            ip = lo.address,
            mask = lo.netmask,
        );
        self.edit_config(target, LoopbackOp::Create, config).await
    }

    async fn delete(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let config = format!(
            r#"<interfaces xmlns="{IF_NS}" xmlns:nc="{BASE_NS}"><interface nc:operation="delete"><name>{}</name></interface></interfaces>"#,
            self.loopback.name
        );
        self.edit_config(target, LoopbackOp::Delete, config).await
    }

    async fn enable(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let config = self.enabled_config(true);
        self.edit_config(target, LoopbackOp::Enable, config).await
    }

    async fn disable(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let config = self.enabled_config(false);
        self.edit_config(target, LoopbackOp::Disable, config).await
    }

    async fn status(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let operation = format!(
            r#"<get><filter type="subtree"><interfaces-state xmlns="{IF_NS}"><interface><name>{}</name></interface></interfaces-state></filter></get>"#,
            self.loopback.name
        );
        let reply = self.transport.rpc(target, &operation).await?;
        let id = &self.loopback.student_id;

        match parse_interface_state(&reply, &self.loopback.name)? {
            None => Ok(messages::not_found(id)),
            Some(state) => {
                tracing::debug!(
                    admin = %state.admin_status,
                    oper = %state.oper_status,
                    "netconf loopback status"
                );
                if state.is_up() {
                    Ok(messages::enabled(id))
                } else {
                    Ok(messages::disabled(id))
                }
            }
        }
    }
}
