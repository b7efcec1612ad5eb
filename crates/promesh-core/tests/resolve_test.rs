// Plan-resolution tests: the name→id chain, per-application isolation,
// eligibility annotation, and the application filter.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promesh_api::PortalClient;
use promesh_core::model::{
    ApplicationConfig, BrokerTarget, DeploymentAction, DomainConfig, EnvironmentTier,
    PreviewSource, RunMode, TargetEnvironment, VersionState,
};
use promesh_core::resolve::{PlanResolver, VersionResolution};

// ── Fixtures ────────────────────────────────────────────────────────

fn target(applications: Vec<ApplicationConfig>) -> TargetEnvironment {
    TargetEnvironment {
        tier: EnvironmentTier::Prd,
        environment_name: "Production".into(),
        mesh_name: "mesh-prd".into(),
        domains: vec![DomainConfig {
            name: "payments".into(),
            applications,
        }],
        brokers: vec![BrokerTarget {
            name: "prd-broker".into(),
            url: "https://prd-broker:943/SEMP/v2/config".into(),
            msg_vpn: "vpn-prd".into(),
            username: "admin".into(),
            password: SecretString::from("secret"),
        }],
    }
}

fn preview_source() -> PreviewSource {
    PreviewSource {
        environment_name: "Development".into(),
        mesh_name: "mesh-dev".into(),
    }
}

fn app(name: &str, version: &str) -> ApplicationConfig {
    ApplicationConfig {
        name: name.into(),
        version: version.into(),
    }
}

async fn mount_runtime_chain(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/architecture/environments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "env-dev", "name": "Development" },
                { "id": "env-prd", "name": "Production" }
            ]
        })))
        .mount(server)
        .await;

    for (env, mesh, mesh_id) in [
        ("env-dev", "mesh-dev", "mesh-dev-id"),
        ("env-prd", "mesh-prd", "mesh-prd-id"),
    ] {
        Mock::given(method("GET"))
            .and(path("/architecture/eventMeshes"))
            .and(query_param("environmentId", env))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [ { "id": mesh_id, "name": mesh } ]
            })))
            .mount(server)
            .await;
    }

    for (mesh_id, broker) in [("mesh-dev-id", "brk-dev"), ("mesh-prd-id", "brk-prd")] {
        Mock::given(method("GET"))
            .and(path("/architecture/messagingServices"))
            .and(query_param("eventMeshId", mesh_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [ { "messagingServiceId": broker, "name": broker } ]
            })))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/architecture/applicationDomains"))
        .and(query_param("name", "payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "id": "dom-1", "name": "payments" } ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/architecture/applications"))
        .and(query_param("applicationDomainId", "dom-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "app-orders", "name": "orders" },
                { "id": "app-refunds", "name": "refunds" }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/architecture/applicationVersions"))
        .and(query_param("applicationIds", "app-orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "ver-released", "version": "1.0.0", "stateId": "2" },
                { "id": "ver-draft", "version": "2.0.0", "stateId": "1" }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/architecture/applicationVersions"))
        .and(query_param("applicationIds", "app-refunds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "ver-r1", "version": "0.9.0", "stateId": "2" }
            ]
        })))
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn resolves_the_full_chain() {
    let server = MockServer::start().await;
    mount_runtime_chain(&server).await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let resolver = PlanResolver::new(&portal);

    let plan = resolver
        .resolve(
            RunMode::Semp,
            DeploymentAction::Deploy,
            &target(vec![app("orders", "1.0.0")]),
            &preview_source(),
            None,
        )
        .await
        .expect("resolution");

    assert_eq!(plan.preview_broker_id, "brk-dev");
    assert_eq!(plan.target_broker_ids, vec!["brk-prd".to_owned()]);
    assert_eq!(plan.domains.len(), 1);
    assert_eq!(plan.domains[0].id, "dom-1");

    let app = &plan.domains[0].applications[0];
    match &app.resolution {
        VersionResolution::Eligible(version) => {
            assert_eq!(version.id, "ver-released");
            assert_eq!(version.state, VersionState::Released);
        }
        other => panic!("expected eligible resolution, got {other:?}"),
    }
}

#[tokio::test]
async fn draft_version_is_ineligible_for_prd_deploy() {
    let server = MockServer::start().await;
    mount_runtime_chain(&server).await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let resolver = PlanResolver::new(&portal);

    let plan = resolver
        .resolve(
            RunMode::Semp,
            DeploymentAction::Deploy,
            &target(vec![app("orders", "2.0.0")]),
            &preview_source(),
            None,
        )
        .await
        .expect("resolution");

    match &plan.domains[0].applications[0].resolution {
        VersionResolution::Ineligible(version) => {
            assert_eq!(version.state, VersionState::Draft);
        }
        other => panic!("expected ineligible resolution, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_version_label_is_missing() {
    let server = MockServer::start().await;
    mount_runtime_chain(&server).await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let resolver = PlanResolver::new(&portal);

    let plan = resolver
        .resolve(
            RunMode::Semp,
            DeploymentAction::Deploy,
            &target(vec![app("orders", "9.9.9")]),
            &preview_source(),
            None,
        )
        .await
        .expect("resolution");

    assert!(matches!(
        plan.domains[0].applications[0].resolution,
        VersionResolution::Missing
    ));
}

#[tokio::test]
async fn unknown_application_resolves_unresolved_without_blocking_siblings() {
    let server = MockServer::start().await;
    mount_runtime_chain(&server).await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let resolver = PlanResolver::new(&portal);

    let plan = resolver
        .resolve(
            RunMode::Semp,
            DeploymentAction::Deploy,
            &target(vec![app("ghost", "1.0.0"), app("refunds", "0.9.0")]),
            &preview_source(),
            None,
        )
        .await
        .expect("resolution");

    let apps = &plan.domains[0].applications;
    assert_eq!(apps.len(), 2);
    assert!(matches!(apps[0].resolution, VersionResolution::Unresolved(_)));
    assert!(matches!(apps[1].resolution, VersionResolution::Eligible(_)));
}

#[tokio::test]
async fn application_filter_limits_the_plan() {
    let server = MockServer::start().await;
    mount_runtime_chain(&server).await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let resolver = PlanResolver::new(&portal);

    let filter = vec!["refunds".to_owned()];
    let plan = resolver
        .resolve(
            RunMode::Semp,
            DeploymentAction::Deploy,
            &target(vec![app("orders", "1.0.0"), app("refunds", "0.9.0")]),
            &preview_source(),
            Some(&filter),
        )
        .await
        .expect("resolution");

    let apps = &plan.domains[0].applications;
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].name, "refunds");
}

#[tokio::test]
async fn missing_portal_environment_is_a_configuration_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/architecture/environments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let portal = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let resolver = PlanResolver::new(&portal);

    let err = resolver
        .resolve(
            RunMode::Semp,
            DeploymentAction::Deploy,
            &target(vec![app("orders", "1.0.0")]),
            &preview_source(),
            None,
        )
        .await
        .expect_err("no environments");

    assert!(matches!(
        err,
        promesh_core::CoreError::Configuration { .. }
    ));
}
