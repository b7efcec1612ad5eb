// Orchestrator-level tests: dependency ordering, failure isolation,
// save side-effect freedom, and configPush call shapes.
//
// Portal and broker endpoints share one mock server; paths don't
// collide, and the shared request log preserves global call order.

use secrecy::SecretString;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promesh_api::{PortalClient, TransportConfig};
use promesh_core::model::{
    ApplicationVersion, BrokerTarget, DeploymentAction, EnvironmentTier, RunMode, VersionState,
};
use promesh_core::reconcile::TracingObserver;
use promesh_core::resolve::{PlannedApplication, PlannedDomain, RunPlan, VersionResolution};
use promesh_core::{Deployer, PreviewArchive};

const VPN: &str = "vpn-tst";

// ── Helpers ─────────────────────────────────────────────────────────

fn released(id: &str) -> VersionResolution {
    VersionResolution::Eligible(ApplicationVersion {
        id: id.into(),
        version: "1.0.0".into(),
        state: VersionState::Released,
    })
}

fn planned_app(name: &str, version_id: &str) -> PlannedApplication {
    PlannedApplication {
        name: name.into(),
        version_label: "1.0.0".into(),
        resolution: released(version_id),
    }
}

fn make_plan(
    mode: RunMode,
    action: DeploymentAction,
    brokers: Vec<BrokerTarget>,
    target_broker_ids: Vec<String>,
    applications: Vec<PlannedApplication>,
) -> RunPlan {
    RunPlan {
        mode,
        action,
        tier: EnvironmentTier::Tst,
        environment_name: "Test".into(),
        preview_broker_id: "brk-src".into(),
        target_broker_ids,
        domains: vec![PlannedDomain {
            name: "payments".into(),
            id: "dom-1".into(),
            applications,
        }],
        brokers,
    }
}

fn broker_target(uri: &str) -> BrokerTarget {
    BrokerTarget {
        name: "tst-broker".into(),
        url: uri.into(),
        msg_vpn: VPN.into(),
        username: "admin".into(),
        password: SecretString::from("secret"),
    }
}

fn full_preview() -> serde_json::Value {
    json!({
        "data": {
            "action": "deploy",
            "requested": [
                {
                    "type": "solaceQueue",
                    "value": {
                        "queueConfiguration": { "queueName": "orders-q" },
                        "subscriptions": []
                    }
                },
                {
                    "type": "solaceAcl",
                    "value": {
                        "aclProfile": { "aclProfileName": "app-acl" },
                        "publishTopicExceptions": [],
                        "subscribeTopicExceptions": []
                    }
                },
                {
                    "type": "solaceClientUsername",
                    "value": { "clientUsername": "svc-orders", "aclProfileName": "app-acl" }
                }
            ],
            "existing": []
        }
    })
}

fn ok_body() -> serde_json::Value {
    json!({ "data": {}, "meta": { "responseCode": 200 } })
}

fn empty_list() -> serde_json::Value {
    json!({ "data": [], "meta": { "responseCode": 200 } })
}

fn not_found_body() -> serde_json::Value {
    json!({
        "meta": {
            "responseCode": 400,
            "error": { "code": 6, "status": "NOT_FOUND", "description": "could not find match" }
        }
    })
}

async fn mount_preview(server: &MockServer, payload: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(
            "/architecture/runtimeManagement/applicationDeploymentPreviews",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(server)
        .await;
}

fn semp_calls(requests: &[wiremock::Request]) -> Vec<(String, String)> {
    requests
        .iter()
        .filter(|r| r.url.path().starts_with("/msgVpns"))
        .map(|r| (r.method.to_string(), r.url.path().to_owned()))
        .collect()
}

fn position(calls: &[(String, String)], verb: &str, path_part: &str) -> usize {
    calls
        .iter()
        .position(|(m, p)| m == verb && p.contains(path_part))
        .unwrap_or_else(|| panic!("no {verb} call touching {path_part}: {calls:?}"))
}

// ── Ordering ────────────────────────────────────────────────────────

#[tokio::test]
async fn deploy_creates_parents_before_dependents() {
    let server = MockServer::start().await;
    mount_preview(&server, full_preview()).await;

    // Everything is absent; creates succeed; child collections empty.
    Mock::given(method("GET"))
        .and(path(format!("/msgVpns/{VPN}/aclProfiles/app-acl")))
        .respond_with(ResponseTemplate::new(400).set_body_json(not_found_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/msgVpns/{VPN}/aclProfiles")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;
    for child in [
        "clientConnectExceptions",
        "publishTopicExceptions",
        "subscribeTopicExceptions",
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/msgVpns/{VPN}/aclProfiles/app-acl/{child}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(empty_list()))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/msgVpns/{VPN}/clientUsernames/svc-orders")))
        .respond_with(ResponseTemplate::new(400).set_body_json(not_found_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/msgVpns/{VPN}/clientUsernames")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/msgVpns/{VPN}/queues/orders-q")))
        .respond_with(ResponseTemplate::new(400).set_body_json(not_found_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/msgVpns/{VPN}/queues")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/msgVpns/{VPN}/queues/orders-q/subscriptions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_list()))
        .mount(&server)
        .await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let archive_dir = TempDir::new().unwrap();
    let observer = TracingObserver;
    let deployer = Deployer::new(
        &portal,
        TransportConfig::default(),
        PreviewArchive::new(archive_dir.path()),
        &observer,
    );

    let plan = make_plan(
        RunMode::Semp,
        DeploymentAction::Deploy,
        vec![broker_target(&server.uri())],
        vec![],
        vec![planned_app("orders", "ver-a")],
    );
    let summary = deployer.run(&plan).await;

    assert_eq!(summary.completed, 1);
    assert!(!summary.has_failures());

    let requests = server.received_requests().await.expect("recording");
    let calls = semp_calls(&requests);

    let acl = position(&calls, "POST", "/aclProfiles");
    let username = position(&calls, "POST", "/clientUsernames");
    let queue = position(&calls, "POST", "/queues");
    assert!(acl < username, "ACL profile must precede client username");
    assert!(username < queue, "client username must precede queue");
}

#[tokio::test]
async fn undeploy_deletes_dependents_before_parents_without_child_deletes() {
    let server = MockServer::start().await;
    mount_preview(&server, full_preview()).await;

    for object in [
        format!("/msgVpns/{VPN}/queues/orders-q"),
        format!("/msgVpns/{VPN}/clientUsernames/svc-orders"),
        format!("/msgVpns/{VPN}/aclProfiles/app-acl"),
    ] {
        Mock::given(method("DELETE"))
            .and(path(object))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let archive_dir = TempDir::new().unwrap();
    let observer = TracingObserver;
    let deployer = Deployer::new(
        &portal,
        TransportConfig::default(),
        PreviewArchive::new(archive_dir.path()),
        &observer,
    );

    let plan = make_plan(
        RunMode::Semp,
        DeploymentAction::Undeploy,
        vec![broker_target(&server.uri())],
        vec![],
        vec![planned_app("orders", "ver-a")],
    );
    let summary = deployer.run(&plan).await;

    assert_eq!(summary.completed, 1);

    let requests = server.received_requests().await.expect("recording");
    let calls = semp_calls(&requests);

    let queue = position(&calls, "DELETE", "/queues/orders-q");
    let username = position(&calls, "DELETE", "/clientUsernames");
    let acl = position(&calls, "DELETE", "/aclProfiles");
    assert!(queue < username, "queue must be deleted before username");
    assert!(username < acl, "username must be deleted before ACL profile");

    // Parent deletes cascade on the broker; no child collection calls.
    assert_eq!(calls.len(), 3, "exactly three parent deletes: {calls:?}");
}

// ── Failure isolation ───────────────────────────────────────────────

#[tokio::test]
async fn one_failing_application_does_not_stop_the_next() {
    let server = MockServer::start().await;

    // Application A's preview blows up portal-side.
    Mock::given(method("POST"))
        .and(path(
            "/architecture/runtimeManagement/applicationDeploymentPreviews",
        ))
        .and(body_partial_json(json!({ "applicationVersionId": "ver-a" })))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "internal portal error", "code": 50001
        })))
        .mount(&server)
        .await;
    // Application B previews fine (nothing requested → no broker calls).
    Mock::given(method("POST"))
        .and(path(
            "/architecture/runtimeManagement/applicationDeploymentPreviews",
        ))
        .and(body_partial_json(json!({ "applicationVersionId": "ver-b" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "requested": [], "existing": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let archive_dir = TempDir::new().unwrap();
    let observer = TracingObserver;
    let deployer = Deployer::new(
        &portal,
        TransportConfig::default(),
        PreviewArchive::new(archive_dir.path()),
        &observer,
    );

    let plan = make_plan(
        RunMode::Semp,
        DeploymentAction::Deploy,
        vec![broker_target(&server.uri())],
        vec![],
        vec![planned_app("app-a", "ver-a"), planned_app("app-b", "ver-b")],
    );
    let summary = deployer.run(&plan).await;

    assert_eq!(summary.failed, 1, "A fails");
    assert_eq!(summary.completed, 1, "B still runs");
}

#[tokio::test]
async fn missing_version_fails_without_broker_calls() {
    let server = MockServer::start().await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let archive_dir = TempDir::new().unwrap();
    let observer = TracingObserver;
    let deployer = Deployer::new(
        &portal,
        TransportConfig::default(),
        PreviewArchive::new(archive_dir.path()),
        &observer,
    );

    let plan = make_plan(
        RunMode::Semp,
        DeploymentAction::Deploy,
        vec![broker_target(&server.uri())],
        vec![],
        vec![PlannedApplication {
            name: "orders".into(),
            version_label: "9.9.9".into(),
            resolution: VersionResolution::Missing,
        }],
    );
    let summary = deployer.run(&plan).await;

    assert_eq!(summary.failed, 1);
    let requests = server.received_requests().await.expect("recording");
    assert!(requests.is_empty(), "no network calls for a missing version");
}

// ── Save ────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_writes_one_preview_file_and_touches_no_broker() {
    let server = MockServer::start().await;
    mount_preview(&server, full_preview()).await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let archive_dir = TempDir::new().unwrap();
    let observer = TracingObserver;
    let deployer = Deployer::new(
        &portal,
        TransportConfig::default(),
        PreviewArchive::new(archive_dir.path()),
        &observer,
    );

    let plan = make_plan(
        RunMode::Semp,
        DeploymentAction::Save,
        vec![broker_target(&server.uri())],
        vec![],
        vec![planned_app("orders", "ver-a")],
    );
    let summary = deployer.run(&plan).await;

    assert_eq!(summary.completed, 1);
    assert!(!summary.has_failures());

    // Exactly one preview file, keyed by tier/domain/app/version/state.
    let expected = archive_dir
        .path()
        .join("tst/payments/orders/1.0.0/preview-released.json");
    assert!(expected.is_file(), "missing {}", expected.display());

    // Zero create/update/delete calls against any broker.
    let requests = server.received_requests().await.expect("recording");
    assert!(
        semp_calls(&requests).is_empty(),
        "save must not touch brokers"
    );
    assert_eq!(requests.len(), 1, "exactly the one preview request");
}

// ── configPush ──────────────────────────────────────────────────────

#[tokio::test]
async fn config_push_deploy_pushes_every_target_broker() {
    let server = MockServer::start().await;

    for broker in ["brk-1", "brk-2"] {
        Mock::given(method("POST"))
            .and(path(
                "/architecture/runtimeManagement/applicationDeploymentPreviews",
            ))
            .and(body_partial_json(json!({ "eventBrokerId": broker })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "requested": [] } })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/architecture/runtimeManagement/applicationDeployments"))
            .and(body_partial_json(json!({
                "eventBrokerId": broker,
                "action": "deploy"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let archive_dir = TempDir::new().unwrap();
    let observer = TracingObserver;
    let deployer = Deployer::new(
        &portal,
        TransportConfig::default(),
        PreviewArchive::new(archive_dir.path()),
        &observer,
    );

    let plan = make_plan(
        RunMode::ConfigPush,
        DeploymentAction::Deploy,
        vec![],
        vec!["brk-1".into(), "brk-2".into()],
        vec![planned_app("orders", "ver-a")],
    );
    let summary = deployer.run(&plan).await;

    assert_eq!(summary.completed, 1);
    assert!(!summary.has_failures());
}

#[tokio::test]
async fn config_push_undeploy_previews_against_the_source_broker() {
    let server = MockServer::start().await;

    // Preview must go to the source broker, not the target.
    Mock::given(method("POST"))
        .and(path(
            "/architecture/runtimeManagement/applicationDeploymentPreviews",
        ))
        .and(body_partial_json(json!({ "eventBrokerId": "brk-src" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "requested": [] } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/architecture/runtimeManagement/applicationDeployments"))
        .and(body_partial_json(json!({
            "eventBrokerId": "brk-1",
            "action": "undeploy"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let archive_dir = TempDir::new().unwrap();
    let observer = TracingObserver;
    let deployer = Deployer::new(
        &portal,
        TransportConfig::default(),
        PreviewArchive::new(archive_dir.path()),
        &observer,
    );

    let plan = make_plan(
        RunMode::ConfigPush,
        DeploymentAction::Undeploy,
        vec![],
        vec!["brk-1".into()],
        vec![planned_app("orders", "ver-a")],
    );
    let summary = deployer.run(&plan).await;

    assert_eq!(summary.completed, 1);
}

#[tokio::test]
async fn config_push_tolerates_not_currently_deployed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(
            "/architecture/runtimeManagement/applicationDeploymentPreviews",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "requested": [] } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/architecture/runtimeManagement/applicationDeployments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "version is not currently deployed"
        })))
        .mount(&server)
        .await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let archive_dir = TempDir::new().unwrap();
    let observer = TracingObserver;
    let deployer = Deployer::new(
        &portal,
        TransportConfig::default(),
        PreviewArchive::new(archive_dir.path()),
        &observer,
    );

    let plan = make_plan(
        RunMode::ConfigPush,
        DeploymentAction::Undeploy,
        vec![],
        vec!["brk-1".into()],
        vec![planned_app("orders", "ver-a")],
    );
    let summary = deployer.run(&plan).await;

    assert_eq!(summary.completed, 1);
    assert!(!summary.has_failures());
}
