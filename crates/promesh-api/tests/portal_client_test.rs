// Integration tests for `PortalClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promesh_api::{Error, PortalClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, PortalClient) {
    let server = MockServer::start().await;
    let client = PortalClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn list_application_domains_by_name() {
    let (server, client) = setup().await;

    let body = json!({
        "data": [
            { "id": "dom-1", "name": "payments" }
        ],
        "meta": { "pagination": { "count": 1 } }
    });

    Mock::given(method("GET"))
        .and(path("/architecture/applicationDomains"))
        .and(query_param("name", "payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let domains = client
        .list_application_domains(Some("payments"))
        .await
        .unwrap();

    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].id, "dom-1");
    assert_eq!(domains[0].name, "payments");
}

#[tokio::test]
async fn list_application_versions_carries_state_id() {
    let (server, client) = setup().await;

    let body = json!({
        "data": [
            { "id": "ver-1", "version": "1.0.0", "stateId": "2" },
            { "id": "ver-2", "version": "1.1.0", "stateId": "1" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/architecture/applicationVersions"))
        .and(query_param("applicationIds", "app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let versions = client.list_application_versions("app-1").await.unwrap();

    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version, "1.0.0");
    assert_eq!(versions[0].state_id, "2");
    assert_eq!(versions[1].state_id, "1");
}

#[tokio::test]
async fn preview_deployment_posts_triple() {
    let (server, client) = setup().await;

    let response = json!({
        "data": {
            "applicationVersionId": "ver-1",
            "eventBrokerId": "brk-1",
            "action": "deploy",
            "requested": [
                { "type": "solaceQueue", "value": { "queueConfiguration": { "queueName": "q" }, "subscriptions": [] } }
            ],
            "existing": []
        }
    });

    Mock::given(method("POST"))
        .and(path(
            "/architecture/runtimeManagement/applicationDeploymentPreviews",
        ))
        .and(body_json(json!({
            "applicationVersionId": "ver-1",
            "action": "deploy",
            "eventBrokerId": "brk-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .expect(1)
        .mount(&server)
        .await;

    let preview = client
        .preview_deployment("ver-1", "deploy", "brk-1")
        .await
        .unwrap();

    assert_eq!(preview["data"]["action"], "deploy");
    assert_eq!(
        preview["data"]["requested"][0]["type"],
        "solaceQueue"
    );
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn portal_error_carries_code_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/architecture/environments"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "token lacks scope",
            "code": 403001
        })))
        .mount(&server)
        .await;

    let err = client.list_environments().await.unwrap_err();

    match err {
        Error::Portal {
            status,
            ref message,
            code,
        } => {
            assert_eq!(status, 403);
            assert_eq!(message, "token lacks scope");
            assert_eq!(code, Some(403001));
        }
        other => panic!("expected Portal error, got: {other:?}"),
    }
}

#[tokio::test]
async fn redundant_deployment_is_a_portal_conflict() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/architecture/runtimeManagement/applicationDeployments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "version is not currently deployed"
        })))
        .mount(&server)
        .await;

    let err = client
        .create_deployment("ver-1", "undeploy", "brk-1")
        .await
        .unwrap_err();

    assert!(err.is_portal_conflict(), "got: {err:?}");
}
