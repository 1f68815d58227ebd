//! Gmail send adapter tests.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use contact_relay::{compose, AccessToken, GmailSender, MailSender, RelayError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn sender(server: &MockServer) -> GmailSender {
    GmailSender::new().base_url(format!("{}/gmail/v1/users/me", server.uri()))
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "18c2f0a1b2c3d4e5",
        "threadId": "18c2f0a1b2c3d4e5",
        "labelIds": ["SENT"]
    }))
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn successful_send_returns_ids() {
    let server = MockServer::start().await;
    let payload = compose("owner@example.com", "owner@example.com", "Hello", "World");

    Mock::given(method("POST"))
        .and(path("/gmail/v1/users/me/messages/send"))
        .and(header("Authorization", "Bearer ya29.token"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "raw": payload.as_str() })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let result = sender(&server)
        .send(&AccessToken::new("ya29.token"), &payload)
        .await
        .unwrap();

    assert_eq!(result.message_id.as_deref(), Some("18c2f0a1b2c3d4e5"));
    assert_eq!(result.thread_id.as_deref(), Some("18c2f0a1b2c3d4e5"));
}

#[tokio::test]
async fn raw_field_decodes_to_composed_message() {
    let server = MockServer::start().await;
    let payload = compose("owner@example.com", "owner@example.com", "Hello", "World");

    Mock::given(method("POST"))
        .and(path("/gmail/v1/users/me/messages/send"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    sender(&server)
        .send(&AccessToken::new("ya29.token"), &payload)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let raw = body["raw"].as_str().unwrap();

    assert!(!raw.contains('+') && !raw.contains('/') && !raw.ends_with('='));
    let text = String::from_utf8(URL_SAFE_NO_PAD.decode(raw).unwrap()).unwrap();
    assert!(text.starts_with("From: owner@example.com\r\n"));
    assert!(text.ends_with("\r\n\r\n<p>World</p>"));
}

#[tokio::test]
async fn sends_user_agent() {
    let server = MockServer::start().await;
    let payload = compose("owner@example.com", "owner@example.com", "Hello", "World");

    Mock::given(method("POST"))
        .and(header(
            "User-Agent",
            format!("contact-relay/{}", contact_relay::VERSION).as_str(),
        ))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(sender(&server)
        .send(&AccessToken::new("ya29.token"), &payload)
        .await
        .is_ok());
}

#[tokio::test]
async fn success_with_empty_body_still_counts() {
    let server = MockServer::start().await;
    let payload = compose("owner@example.com", "owner@example.com", "Hello", "World");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = sender(&server)
        .send(&AccessToken::new("ya29.token"), &payload)
        .await
        .unwrap();
    assert!(result.message_id.is_none());
}

// ============================================================================
// Error Tests
// ============================================================================

#[tokio::test]
async fn rejected_send_carries_status_and_body() {
    let server = MockServer::start().await;
    let payload = compose("owner@example.com", "owner@example.com", "Hello", "World");

    let error_body = json!({
        "error": {
            "code": 401,
            "message": "Request had invalid authentication credentials.",
            "status": "UNAUTHENTICATED"
        }
    });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body))
        .expect(1)
        .mount(&server)
        .await;

    let err = sender(&server)
        .send(&AccessToken::new("expired"), &payload)
        .await
        .unwrap_err();

    match err {
        RelayError::ProviderSend { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("UNAUTHENTICATED"));
        }
        other => panic!("expected ProviderSend, got {:?}", other),
    }
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    let payload = compose("owner@example.com", "owner@example.com", "Hello", "World");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(1)
        .mount(&server)
        .await;

    let err = sender(&server)
        .send(&AccessToken::new("ya29.token"), &payload)
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::ProviderSend { status: 500, .. }));
}

#[tokio::test]
async fn unreachable_api_is_http_error() {
    let sender = GmailSender::new().base_url("http://127.0.0.1:9/gmail/v1/users/me");
    let payload = compose("owner@example.com", "owner@example.com", "Hello", "World");

    let err = sender
        .send(&AccessToken::new("ya29.token"), &payload)
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Http(_)));
}

#[tokio::test]
async fn provider_name() {
    assert_eq!(GmailSender::new().provider_name(), "gmail");
}
