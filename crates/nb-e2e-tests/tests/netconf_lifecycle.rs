//! E2E tests for the loopback lifecycle over NETCONF (scripted transport).

mod helpers;

use helpers::{NETCONF_ERROR, NETCONF_OK, TestHarness, netconf_state};
use nb_agent::session::Session;

#[tokio::test]
async fn e2e_netconf_create_and_status() {
    let h = TestHarness::start().await;
    let mut session = Session::new();
    let transport = h.netconf.transport();
    transport.push_reply(NETCONF_OK);
    transport.push_reply(&netconf_state("up", "up"));

    assert_eq!(
        h.say(&mut session, "/66070123 netconf").await.as_deref(),
        Some("Ok: Netconf")
    );
    assert_eq!(
        h.say(&mut session, "/66070123 10.0.15.61 create").await.as_deref(),
        Some("Interface loopback 66070123 is created successfully using Netconf")
    );
    assert_eq!(
        h.say(&mut session, "/66070123 10.0.15.61 status").await.as_deref(),
        Some("Interface loopback 66070123 is enabled (checked by Netconf)")
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|(host, _)| host == "10.0.15.61"));
    assert!(requests[0].1.contains("<edit-config>"));
    assert!(requests[1].1.contains("<interfaces-state"));
    // RESTCONF router never contacted.
    assert!(h.router.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn e2e_netconf_rpc_error_on_enable() {
    let h = TestHarness::start().await;
    let mut session = Session::new();
    h.netconf.transport().push_reply(NETCONF_ERROR);

    h.say(&mut session, "/66070123 netconf").await;
    assert_eq!(
        h.say(&mut session, "/66070123 10.0.15.61 enable").await.as_deref(),
        Some("Cannot enable: Interface loopback 66070123")
    );
}

#[tokio::test]
async fn e2e_netconf_status_missing_interface() {
    let h = TestHarness::start().await;
    let mut session = Session::new();
    h.netconf
        .transport()
        .push_reply(r#"<rpc-reply message-id="101"><data/></rpc-reply>"#);

    h.say(&mut session, "/66070123 netconf").await;
    assert_eq!(
        h.say(&mut session, "/66070123 10.0.15.61 status").await.as_deref(),
        Some("No Interface loopback 66070123 (checked by Netconf)")
    );
}

#[tokio::test]
async fn e2e_netconf_transport_failure() {
    let h = TestHarness::start().await;
    let mut session = Session::new();
    h.netconf.transport().push_error("connection refused");

    h.say(&mut session, "/66070123 netconf").await;
    assert_eq!(
        h.say(&mut session, "/66070123 10.0.15.61 disable").await.as_deref(),
        Some("Error executing disable: NETCONF error: connection refused")
    );
}

/// Switching methods mid-session reroutes the next command.
#[tokio::test]
async fn e2e_switch_method_between_commands() {
    let h = TestHarness::start().await;
    let mut session = Session::new();
    h.netconf.transport().push_reply(NETCONF_OK);
    h.mount_status("POST", "/restconf/data/ietf-interfaces:interfaces", 201)
        .await;

    h.say(&mut session, "/66070123 netconf").await;
    let first = h.say(&mut session, "/66070123 127.0.0.1 create").await.unwrap();
    assert!(first.ends_with("using Netconf"));

    h.say(&mut session, "/66070123 restconf").await;
    let second = h.say(&mut session, "/66070123 127.0.0.1 create").await.unwrap();
    assert!(second.ends_with("using Restconf"));
}
