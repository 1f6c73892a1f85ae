//! Shared test harness for E2E integration tests.
//!
//! Wires the real dispatcher to a RESTCONF client talking to a `wiremock`
//! server, a NETCONF client over a scripted transport, and mocked CLI and
//! batch backends.

#![allow(dead_code)]

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nb_agent::dispatcher::CommandDispatcher;
use nb_agent::session::Session;
use nb_device_tools::{
    CliScraper, Credentials, LoopbackSpec, MockBatchRunner, MockCliTransport,
    MockNetconfTransport, NetconfClient, RestconfClient, RestconfConfig,
};
use nb_protocol::Reply;

pub const SID: &str = "66070123";
pub const ROUTER: &str = "127.0.0.1";

pub const IF_PATH: &str = "/restconf/data/ietf-interfaces:interfaces/interface=Loopback66070123";
pub const STATE_PATH: &str =
    "/restconf/data/ietf-interfaces:interfaces-state/interface=Loopback66070123";

pub const NETCONF_OK: &str =
    r#"<rpc-reply message-id="101" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><ok/></rpc-reply>"#;
pub const NETCONF_ERROR: &str = r#"<rpc-reply message-id="101" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><rpc-error><error-tag>data-exists</error-tag></rpc-error></rpc-reply>"#;

/// Interfaces-state reply for the session loopback.
pub fn netconf_state(admin: &str, oper: &str) -> String {
    format!(
        r#"<rpc-reply message-id="101" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><data><interfaces-state xmlns="urn:ietf:params:xml:ns:yang:ietf-interfaces"><interface><name>Loopback66070123</name><admin-status>{admin}</admin-status><oper-status>{oper}</oper-status></interface></interfaces-state></data></rpc-reply>"#
    )
}

/// End-to-end harness: real adapters where a fake server is practical,
/// mocks elsewhere.
pub struct TestHarness {
    /// Stand-in RESTCONF server for the router.
    pub router: MockServer,
    pub restconf: RestconfClient,
    pub netconf: NetconfClient<MockNetconfTransport>,
    pub cli: CliScraper<MockCliTransport>,
    pub batch: MockBatchRunner,
}

impl TestHarness {
    pub async fn start() -> Self {
        let router = MockServer::start().await;
        let config = RestconfConfig {
            scheme: "http".into(),
            port: Some(router.address().port()),
            timeout_secs: 5,
        };
        let loopback = LoopbackSpec::for_student(SID);
        let restconf = RestconfClient::new(config, loopback.clone()).unwrap();

        Self {
            router,
            restconf,
            netconf: NetconfClient::new(MockNetconfTransport::new(), loopback),
            cli: CliScraper::new(MockCliTransport::new()),
            batch: MockBatchRunner::new(),
        }
    }

    pub fn dispatcher(&self) -> CommandDispatcher<'_> {
        CommandDispatcher::new(
            &self.restconf,
            &self.netconf,
            &self.cli,
            &self.batch,
            Credentials::new("admin", "cisco"),
            SID,
        )
    }

    /// Dispatch one chat line and return the reply body.
    pub async fn say(&self, session: &mut Session, text: &str) -> Option<String> {
        self.dispatcher()
            .handle_text(session, text)
            .await
            .map(|r| r.body().to_string())
    }

    pub async fn reply(&self, session: &mut Session, text: &str) -> Option<Reply> {
        self.dispatcher().handle_text(session, text).await
    }

    /// Mount a RESTCONF route answering with a bare status.
    pub async fn mount_status(&self, http_method: &str, route: &str, status: u16) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.router)
            .await;
    }

    /// Mount config + state routes for a status read.
    pub async fn mount_loopback_state(&self, enabled: bool, oper: &str) {
        Mock::given(method("GET"))
            .and(path(IF_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ietf-interfaces:interface": { "name": "Loopback66070123", "enabled": enabled }
            })))
            .mount(&self.router)
            .await;
        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ietf-interfaces:interface": { "name": "Loopback66070123", "oper-status": oper }
            })))
            .mount(&self.router)
            .await;
    }
}
