use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_api::ApiClient;
use shared_config::AppConfig;

fn test_config(base_url: String) -> AppConfig {
    AppConfig {
        api_base_url: base_url,
        api_key: "test-key".to_string(),
        clinic_id: "clinic-1".to_string(),
        offline_cache_path: ":memory:".to_string(),
    }
}

#[tokio::test]
async fn call_sends_action_clinic_and_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("apikey", "test-key"))
        .and(body_partial_json(json!({
            "action": "agenda.list",
            "clinic_id": "clinic-1",
            "payload": {"start": "2024-06-03"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"ok": true}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(mock_server.uri()));
    let data = client
        .call("agenda.list", json!({"start": "2024-06-03"}))
        .await
        .unwrap();

    assert_eq!(data, json!({"ok": true}));
}

#[tokio::test]
async fn rejected_envelope_becomes_an_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": ["invalid period"]
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(mock_server.uri()));
    let err = client.call("agenda.list", json!({})).await.unwrap_err();

    assert!(err.to_string().contains("invalid period"));
}

#[tokio::test]
async fn http_failure_maps_to_a_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(mock_server.uri()));
    let err = client.call("agenda.list", json!({})).await.unwrap_err();

    assert!(err.to_string().contains("backend exploded"));
}

#[tokio::test]
async fn auth_failures_are_reported_distinctly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(mock_server.uri()));
    let err = client.call("agenda.list", json!({})).await.unwrap_err();

    assert!(err.to_string().contains("Authentication error"));
}
