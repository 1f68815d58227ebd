//! Google refresh-token exchange tests.

use contact_relay::{Credentials, GoogleTokenProvider, RelayConfig, RelayError, TokenProvider};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn credentials() -> Credentials {
    Credentials::new(
        "client-123.apps.googleusercontent.com",
        "GOCSPX-client-secret",
        "1//refresh-token",
        "owner@example.com",
    )
    .unwrap()
}

fn provider(server: &MockServer) -> GoogleTokenProvider {
    GoogleTokenProvider::new(credentials()).token_url(format!("{}/token", server.uri()))
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "ya29.fresh-access-token",
        "expires_in": 3599,
        "scope": "https://www.googleapis.com/auth/gmail.send",
        "token_type": "Bearer"
    }))
}

// ============================================================================
// Exchange Tests
// ============================================================================

#[tokio::test]
async fn successful_exchange_returns_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let token = provider(&server).acquire_access_token().await.unwrap();
    assert_eq!(token.secret(), "ya29.fresh-access-token");
}

#[tokio::test]
async fn exchange_posts_refresh_token_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    provider(&server).acquire_access_token().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let mut form: Vec<(String, String)> = serde_urlencoded::from_bytes(&requests[0].body).unwrap();
    form.sort();
    assert_eq!(
        form,
        vec![
            (
                "client_id".to_string(),
                "client-123.apps.googleusercontent.com".to_string()
            ),
            (
                "client_secret".to_string(),
                "GOCSPX-client-secret".to_string()
            ),
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), "1//refresh-token".to_string()),
        ]
    );
}

#[tokio::test]
async fn each_call_is_a_fresh_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(success_response())
        .expect(3)
        .mount(&server)
        .await;

    let provider = provider(&server);
    for _ in 0..3 {
        provider.acquire_access_token().await.unwrap();
    }
}

#[tokio::test]
async fn from_config_uses_configured_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let mut config = RelayConfig::new(credentials());
    config.token_url = format!("{}/oauth/token", server.uri());
    let provider = GoogleTokenProvider::from_config(&config, config.http_client().unwrap());

    assert!(provider.acquire_access_token().await.is_ok());
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn rejected_exchange_returns_error_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server).acquire_access_token().await.unwrap_err();
    match err {
        RelayError::TokenExchange { message, status } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "Token has been expired or revoked.");
        }
        other => panic!("expected TokenExchange, got {:?}", other),
    }
}

#[tokio::test]
async fn rejected_exchange_without_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = provider(&server).acquire_access_token().await.unwrap_err();
    assert!(matches!(
        err,
        RelayError::TokenExchange {
            status: Some(503),
            ..
        }
    ));
}

#[tokio::test]
async fn success_without_access_token_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    let err = provider(&server).acquire_access_token().await.unwrap_err();
    match err {
        RelayError::TokenExchange { message, status } => {
            assert!(status.is_none());
            assert!(message.contains("access_token"));
        }
        other => panic!("expected TokenExchange, got {:?}", other),
    }
}

#[tokio::test]
async fn success_with_empty_access_token_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "" })))
        .mount(&server)
        .await;

    let err = provider(&server).acquire_access_token().await.unwrap_err();
    assert!(matches!(err, RelayError::TokenExchange { .. }));
}

#[tokio::test]
async fn success_with_garbage_body_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server).acquire_access_token().await.unwrap_err();
    assert!(matches!(err, RelayError::TokenExchange { .. }));
}

#[tokio::test]
async fn unreachable_endpoint_is_error() {
    // Nothing listens on port 9 (discard) on CI hosts.
    let provider =
        GoogleTokenProvider::new(credentials()).token_url("http://127.0.0.1:9/token");

    let err = provider.acquire_access_token().await.unwrap_err();
    assert!(matches!(err, RelayError::TokenExchange { status: None, .. }));
}

#[tokio::test]
async fn missing_credentials_fail_before_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(success_response())
        .expect(0)
        .mount(&server)
        .await;

    let mut creds = credentials();
    creds.refresh_token.clear();
    let provider = GoogleTokenProvider::new(creds).token_url(format!("{}/token", server.uri()));

    let err = provider.acquire_access_token().await.unwrap_err();
    assert!(matches!(err, RelayError::Configuration(_)));
}

#[tokio::test]
async fn provider_name() {
    assert_eq!(GoogleTokenProvider::new(credentials()).provider_name(), "google");
}
