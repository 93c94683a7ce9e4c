//! Integration tests for the recurring task API using wiremock
//!
//! These tests verify request shapes (method, path, credentials, body) and
//! the mapping of HTTP failures into `ApiError`.

use pdconfig_client::models::{
    AddGenerateServerProfileRecurringTaskRequest, GENERATE_SERVER_PROFILE_SCHEMA, Operation,
    OperationType, UpdateRequest,
};
use pdconfig_client::{ApiClient, ApiError, Configuration, Credentials, RecurringTaskApi};
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    let configuration = Configuration::new(
        Url::parse(&server.uri()).unwrap(),
        Credentials::new("cn=administrator", "2FederateM0re"),
    );
    ApiClient::new(configuration).unwrap()
}

fn task_body(name: &str) -> serde_json::Value {
    json!({
        "schemas": [GENERATE_SERVER_PROFILE_SCHEMA],
        "id": name,
        "profileDirectory": "/opt/profiles",
        "retainPreviousProfileCount": 10,
        "cancelOnTaskDependencyFailure": false,
        "alertOnStart": false
    })
}

#[tokio::test]
async fn add_posts_body_with_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/config/recurring-tasks"))
        .and(basic_auth("cn=administrator", "2FederateM0re"))
        .and(body_json(json!({
            "taskName": "nightly",
            "schemas": [GENERATE_SERVER_PROFILE_SCHEMA],
            "profileDirectory": "/opt/profiles"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body("nightly")))
        .expect(1)
        .mount(&server)
        .await;

    let request = AddGenerateServerProfileRecurringTaskRequest::new("nightly", "/opt/profiles");
    let response = client(&server).add_recurring_task(&request).await.unwrap();

    assert_eq!(response.id, "nightly");
    assert_eq!(response.retain_previous_profile_count, Some(10));
}

#[tokio::test]
async fn get_returns_task() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/config/recurring-tasks/nightly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body("nightly")))
        .mount(&server)
        .await;

    let response = client(&server).get_recurring_task("nightly").await.unwrap();
    assert_eq!(response.profile_directory, "/opt/profiles");
    assert_eq!(response.alert_on_start, Some(false));
}

#[tokio::test]
async fn get_missing_task_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/config/recurring-tasks/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "schemas": ["urn:pingidentity:schemas:2.0:Error"],
            "status": "404",
            "detail": "Recurring Task missing not found"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_recurring_task("missing")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.response_body().unwrap().contains("not found"));
}

#[tokio::test]
async fn update_sends_operations() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/config/recurring-tasks/nightly"))
        .and(body_json(json!({
            "operations": [{"op": "replace", "path": "alertOnStart", "value": true}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "nightly",
            "profileDirectory": "/opt/profiles",
            "alertOnStart": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = UpdateRequest::new(vec![Operation {
        op: OperationType::Replace,
        path: "alertOnStart".to_string(),
        value: Some(json!(true)),
    }]);
    let response = client(&server)
        .update_recurring_task("nightly", &request)
        .await
        .unwrap();
    assert_eq!(response.alert_on_start, Some(true));
}

#[tokio::test]
async fn delete_succeeds_on_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/config/recurring-tasks/nightly"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .delete_recurring_task("nightly")
        .await
        .unwrap();
}

#[tokio::test]
async fn unauthorized_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server)
        .delete_recurring_task("nightly")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status, .. } if status == 401));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_recurring_task("nightly")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
