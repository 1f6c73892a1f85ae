//! RESTCONF adapter (ietf-interfaces over HTTPS, YANG/JSON).
//!
//! Lab routers serve self-signed certificates, so certificate checks are
//! off. Every request carries basic auth from the per-call target.

use std::time::Duration;

use async_trait::async_trait;
use nb_protocol::MethodKind;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::error::{DeviceError, DeviceResult};
use crate::messages::{self, LoopbackOp};
use crate::structured::StructuredConfig;
use crate::types::{DeviceTarget, LoopbackSpec};

const YANG_JSON: &str = "application/yang-data+json";

/// RESTCONF endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RestconfConfig {
    /// `https` on real routers; `http` is only useful against test servers.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Explicit port. None uses the scheme default.
    #[serde(default)]
    pub port: Option<u16>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_scheme() -> String {
    "https".into()
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for RestconfConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            port: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Structured-config adapter A.
pub struct RestconfClient {
    client: reqwest::Client,
    config: RestconfConfig,
    loopback: LoopbackSpec,
}

impl RestconfClient {
    pub fn new(config: RestconfConfig, loopback: LoopbackSpec) -> DeviceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            client,
            config,
            loopback,
        })
    }

    fn base_url(&self, target: &DeviceTarget) -> String {
        match self.config.port {
            Some(port) => format!("{}://{}:{port}/restconf", self.config.scheme, target.host),
            None => format!("{}://{}/restconf", self.config.scheme, target.host),
        }
    }

    fn interfaces_url(&self, target: &DeviceTarget) -> String {
        format!("{}/data/ietf-interfaces:interfaces", self.base_url(target))
    }

    fn interface_url(&self, target: &DeviceTarget) -> String {
        format!(
            "{}/interface={}",
            self.interfaces_url(target),
            self.loopback.name
        )
    }

    fn interface_state_url(&self, target: &DeviceTarget) -> String {
        format!(
            "{}/data/ietf-interfaces:interfaces-state/interface={}",
            self.base_url(target),
            self.loopback.name
        )
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        target: &DeviceTarget,
        body: Option<serde_json::Value>,
    ) -> DeviceResult<reqwest::Response> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(
                &target.credentials.username,
                Some(&target.credentials.password),
            )
            .header(ACCEPT, YANG_JSON)
            .header(CONTENT_TYPE, YANG_JSON);

        if let Some(body) = body {
            let bytes =
                serde_json::to_vec(&body).map_err(|e| DeviceError::Decode(e.to_string()))?;
            request = request.body(bytes);
        }

        let response = request.send().await?;
        tracing::debug!(
            method = %method,
            url = %url,
            status = response.status().as_u16(),
            "restconf response"
        );
        Ok(response)
    }

    /// Map a mutation response: 2xx is success, `missing` is the status that
    /// means "cannot", anything else is an error.
    fn mutation_outcome(
        &self,
        op: LoopbackOp,
        status: StatusCode,
        missing: StatusCode,
    ) -> DeviceResult<String> {
        let id = &self.loopback.student_id;
        if status.is_success() {
            Ok(messages::succeeded(op, id))
        } else if status == missing {
            Ok(messages::cannot(op, id))
        } else {
            Err(DeviceError::UnexpectedStatus {
                operation: op.verb(),
                status: status.as_u16(),
            })
        }
    }

    async fn set_enabled(&self, target: &DeviceTarget, enabled: bool) -> DeviceResult<String> {
        let op = if enabled {
            LoopbackOp::Enable
        } else {
            LoopbackOp::Disable
        };
        let body = json!({ "ietf-interfaces:interface": { "enabled": enabled } });
        let response = self
            .send(Method::PATCH, &self.interface_url(target), target, Some(body))
            .await?;
        self.mutation_outcome(op, response.status(), StatusCode::NOT_FOUND)
    }
}

#[async_trait]
impl StructuredConfig for RestconfClient {
    fn method(&self) -> MethodKind {
        MethodKind::Restconf
    }

    async fn create(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let body = json!({
            "ietf-interfaces:interface": {
                "name": self.loopback.name,
                "description": self.loopback.description(),
                "type": "iana-if-type:softwareLoopback",
                "enabled": true,
                "ietf-ip:ipv4": {
                    "address": [
                        { "ip": self.loopback.address, "netmask": self.loopback.netmask }
                    ]
                }
            }
        });
        let response = self
            .send(Method::POST, &self.interfaces_url(target), target, Some(body))
            .await?;
        self.mutation_outcome(LoopbackOp::Create, response.status(), StatusCode::CONFLICT)
    }

    async fn delete(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let response = self
            .send(Method::DELETE, &self.interface_url(target), target, None)
            .await?;
        self.mutation_outcome(LoopbackOp::Delete, response.status(), StatusCode::NOT_FOUND)
    }

    async fn enable(&self, target: &DeviceTarget) -> DeviceResult<String> {
        self.set_enabled(target, true).await
    }

    async fn disable(&self, target: &DeviceTarget) -> DeviceResult<String> {
        self.set_enabled(target, false).await
    }

    async fn status(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let id = &self.loopback.student_id;

        let config = self
            .send(Method::GET, &self.interface_url(target), target, None)
            .await?;
        if config.status() == StatusCode::NOT_FOUND {
            return Ok(messages::not_found(id));
        }
        if !config.status().is_success() {
            return Err(DeviceError::UnexpectedStatus {
                operation: "status",
                status: config.status().as_u16(),
            });
        }
        let config: serde_json::Value = config.json().await?;
        let admin_up = config["ietf-interfaces:interface"]["enabled"]
            .as_bool()
            .unwrap_or(false);

        // Operational state is best-effort: a failed read counts as down.
        let state = self
            .send(Method::GET, &self.interface_state_url(target), target, None)
            .await?;
        let oper_status = if state.status().is_success() {
            let state: serde_json::Value = state.json().await?;
            state["ietf-interfaces:interface"]["oper-status"]
                .as_str()
                .map(str::to_string)
        } else {
            None
        };

        tracing::debug!(admin_up, oper_status = ?oper_status, "restconf loopback status");

        if admin_up && oper_status.as_deref() == Some("up") {
            Ok(messages::enabled(id))
        } else {
            Ok(messages::disabled(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::types::Credentials;

    const IF_PATH: &str = "/restconf/data/ietf-interfaces:interfaces/interface=Loopback66070123";
    const STATE_PATH: &str =
        "/restconf/data/ietf-interfaces:interfaces-state/interface=Loopback66070123";

    fn client_for(server: &MockServer) -> (RestconfClient, DeviceTarget) {
        let config = RestconfConfig {
            scheme: "http".into(),
            port: Some(server.address().port()),
            timeout_secs: 2,
        };
        let client = RestconfClient::new(config, LoopbackSpec::for_student("66070123")).unwrap();
        let target = DeviceTarget::new(
            server.address().ip().to_string(),
            Credentials::new("admin", "cisco"),
        );
        (client, target)
    }

    #[tokio::test]
    async fn create_posts_loopback_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/restconf/data/ietf-interfaces:interfaces"))
            .and(basic_auth("admin", "cisco"))
            .and(header("content-type", YANG_JSON))
            .and(body_partial_json(json!({
                "ietf-interfaces:interface": {
                    "name": "Loopback66070123",
                    "type": "iana-if-type:softwareLoopback",
                    "ietf-ip:ipv4": { "address": [{ "ip": "172.1.23.1", "netmask": "255.255.255.0" }] }
                }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let msg = client.create(&target).await.unwrap();
        assert_eq!(msg, "Interface loopback 66070123 is created successfully");
    }

    #[tokio::test]
    async fn create_conflict_cannot_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let msg = client.create(&target).await.unwrap();
        assert_eq!(msg, "Cannot create: Interface loopback 66070123");
    }

    #[tokio::test]
    async fn create_server_error_is_err() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let err = client.create(&target).await.unwrap_err();
        assert!(matches!(
            err,
            DeviceError::UnexpectedStatus { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn delete_missing_cannot_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(IF_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let msg = client.delete(&target).await.unwrap();
        assert_eq!(msg, "Cannot delete: Interface loopback 66070123");
    }

    #[tokio::test]
    async fn disable_patches_enabled_false() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(IF_PATH))
            .and(body_partial_json(
                json!({ "ietf-interfaces:interface": { "enabled": false } }),
            ))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let msg = client.disable(&target).await.unwrap();
        assert_eq!(msg, "Interface loopback 66070123 is shutdowned successfully");
    }

    #[tokio::test]
    async fn enable_missing_cannot_enable() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let msg = client.enable(&target).await.unwrap();
        assert_eq!(msg, "Cannot enable: Interface loopback 66070123");
    }

    #[tokio::test]
    async fn status_enabled_when_admin_and_oper_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(IF_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ietf-interfaces:interface": { "name": "Loopback66070123", "enabled": true }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ietf-interfaces:interface": { "name": "Loopback66070123", "oper-status": "up" }
            })))
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let msg = client.status(&target).await.unwrap();
        assert_eq!(msg, "Interface loopback 66070123 is enabled");
    }

    #[tokio::test]
    async fn status_disabled_when_admin_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(IF_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ietf-interfaces:interface": { "enabled": false }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(STATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ietf-interfaces:interface": { "oper-status": "down" }
            })))
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let msg = client.status(&target).await.unwrap();
        assert_eq!(msg, "Interface loopback 66070123 is disabled");
    }

    #[tokio::test]
    async fn status_missing_interface() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(IF_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (client, target) = client_for(&server);
        let msg = client.status(&target).await.unwrap();
        assert_eq!(msg, "No Interface loopback 66070123");
    }

    #[tokio::test]
    async fn unreachable_device_is_err() {
        let config = RestconfConfig {
            scheme: "http".into(),
            port: Some(1),
            timeout_secs: 1,
        };
        let client = RestconfClient::new(config, LoopbackSpec::for_student("66070123")).unwrap();
        let target = DeviceTarget::new("127.0.0.1", Credentials::new("admin", "cisco"));
        assert!(matches!(
            client.status(&target).await,
            Err(DeviceError::Http(_))
        ));
    }
}
