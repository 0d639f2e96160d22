use std::collections::HashMap;

use assert_matches::assert_matches;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::PushClient;
use shared_config::AppConfig;
use shared_models::external::{ExternalError, PushGateway};

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        bind_port: 0,
        push_gateway_url: server.uri(),
        push_gateway_api_key: "test-api-key".to_string(),
        push_send_timeout_secs: 2,
        dispatcher_workers: 10,
        dispatcher_batch_size: 50,
        dispatcher_poll_secs: 15,
        trigger_timeout_secs: 30,
        max_trigger_attempts: 5,
        reminder_lead_hours: 24,
        reminder_window_minutes: 60,
        reminder_interval_secs: 3600,
        reminder_chunk_size: 50,
        retention_days: 7,
        retention_batch_size: 500,
        retention_interval_secs: 604_800,
    }
}

#[tokio::test]
async fn send_posts_the_payload_and_returns_the_delivery_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_partial_json(serde_json::json!({
            "to": "device-token",
            "title": "Appointment confirmed",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "delivery_id": "dlv-42",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PushClient::new(&config_for(&server));

    let mut data = HashMap::new();
    data.insert("appointment_id".to_string(), "abc".to_string());

    let delivery_id = client
        .send("device-token", "Appointment confirmed", "See you tomorrow", data)
        .await
        .unwrap();

    assert_eq!(delivery_id, "dlv-42");
}

#[tokio::test]
async fn gateway_errors_surface_as_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = PushClient::new(&config_for(&server));

    let result = client
        .send("device-token", "title", "body", HashMap::new())
        .await;

    assert_matches!(result, Err(ExternalError::Unavailable(msg)) => {
        assert!(msg.contains("503"));
    });
}

#[tokio::test]
async fn malformed_gateway_response_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = PushClient::new(&config_for(&server));

    let result = client
        .send("device-token", "title", "body", HashMap::new())
        .await;

    assert_matches!(result, Err(ExternalError::Unavailable(_)));
}
