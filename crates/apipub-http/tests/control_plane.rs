use std::time::Duration;

use apipub_core::{ControlPlane, ControlPlaneError, DeploymentManager, ErrorCategory};
use apipub_http::HttpControlPlane;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpControlPlane {
    HttpControlPlane::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_apis_decodes_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/apis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"apiId": "abc123", "name": "demo", "apiEndpoint": "https://abc123.example"}
            ],
            "nextToken": "page-2"
        })))
        .mount(&server)
        .await;

    let page = client(&server).list_apis(None).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].api_id, "abc123");
    assert_eq!(page.items[0].api_endpoint, "https://abc123.example");
    assert_eq!(page.next_token.as_deref(), Some("page-2"));
}

#[tokio::test]
async fn test_list_apis_sends_next_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/apis"))
        .and(query_param("nextToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server).list_apis(Some("page-2")).await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.next_token.is_none());
}

#[tokio::test]
async fn test_import_sends_definition_and_fails_on_warnings() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/apis"))
        .and(query_param("failOnWarnings", "true"))
        .and(body_json(json!({"body": "openapi: 3.0.1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "apiId": "new1", "name": "demo", "apiEndpoint": "https://new1.example"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server)
        .import_api("openapi: 3.0.1", true)
        .await
        .unwrap();
    assert_eq!(api.api_id, "new1");
}

#[tokio::test]
async fn test_import_rejection_is_validation() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/apis"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "Warnings found during import"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).import_api("x", true).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Definition rejected: Warnings found during import");
}

#[tokio::test]
async fn test_reimport_unprocessable_is_validation() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/apis/abc123"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad integration"))
        .mount(&server)
        .await;

    let err = client(&server)
        .reimport_api("abc123", "x", true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ControlPlaneError::Validation { ref message } if message == "bad integration"
    ));
}

#[tokio::test]
async fn test_reimport_missing_api_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/apis/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .reimport_api("gone", "x", true)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_is_remote() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/apis/abc123"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let err = client(&server).delete_api("abc123").await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Remote);
    assert!(err.to_string().starts_with("DeleteApi failed: HTTP 503"));
    assert!(err.to_string().contains("try later"));
}

#[tokio::test]
async fn test_bad_request_outside_import_is_remote() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/apis/abc123/stages"))
        .respond_with(ResponseTemplate::new(400).set_body_string("stage exists"))
        .mount(&server)
        .await;

    let spec = DeploymentManager::stage_spec("demo-stage", "arn:logs", 1, 1);
    let err = client(&server)
        .create_stage("abc123", &spec)
        .await
        .unwrap_err();
    assert!(!err.is_validation());
    assert_eq!(err.category(), ErrorCategory::Remote);
}

#[tokio::test]
async fn test_get_stage_missing_is_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/apis/abc123/stages/demo-stage"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let lookup = client(&server)
        .get_stage("abc123", "demo-stage")
        .await
        .unwrap();
    assert!(lookup.is_absent());
}

#[tokio::test]
async fn test_get_stage_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/apis/abc123/stages/demo-stage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stageName": "demo-stage",
            "autoDeploy": true
        })))
        .mount(&server)
        .await;

    let lookup = client(&server)
        .get_stage("abc123", "demo-stage")
        .await
        .unwrap();
    match lookup {
        apipub_core::StageLookup::Found(stage) => {
            assert_eq!(stage.stage_name, "demo-stage");
            assert!(stage.auto_deploy);
            assert!(stage.default_route_settings.is_none());
        }
        apipub_core::StageLookup::Absent => panic!("expected a stage"),
    }
}

#[tokio::test]
async fn test_create_stage_sends_spec() {
    let server = MockServer::start().await;
    let spec = DeploymentManager::stage_spec("demo-stage", "arn:logs", 20, 10);
    let expected = serde_json::to_value(&spec).unwrap();

    assert_eq!(expected["defaultRouteSettings"]["throttlingBurstLimit"], 20);
    assert_eq!(expected["accessLogSettings"]["destinationArn"], "arn:logs");

    Mock::given(method("POST"))
        .and(path("/v2/apis/abc123/stages"))
        .and(body_json(expected.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(expected))
        .expect(1)
        .mount(&server)
        .await;

    let stage = client(&server).create_stage("abc123", &spec).await.unwrap();
    assert_eq!(stage.stage_name, "demo-stage");
    assert_eq!(stage.default_route_settings.unwrap().throttling_rate_limit, 10);
}

#[tokio::test]
async fn test_delete_stage_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/apis/abc123/stages/demo-stage"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .delete_stage("abc123", "demo-stage")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_malformed_body_is_remote() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/apis"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server).list_apis(None).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Remote);
    assert!(err.to_string().contains("Failed to parse response JSON"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_remote() {
    let client = HttpControlPlane::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();

    let err = client.list_apis(None).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Remote);
    assert!(err.to_string().contains("Failed to connect"));
}
