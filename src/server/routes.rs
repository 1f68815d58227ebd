//! Route handlers for the contact endpoint.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::relay::Relay;

/// Largest accepted request body. Bigger bodies get `413 Payload Too Large`.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the API router (no security headers).
pub fn create_router(relay: Relay) -> Router {
    Router::new()
        .route("/api/mail", post(send_mail))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/mail - Relay a contact-form submission.
async fn send_mail(State(relay): State<Relay>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match relay.handle(content_type, &body).await {
        Ok(_) => (StatusCode::OK, Json(SuccessResponse { status: "success" })).into_response(),
        Err(e) => {
            if e.is_client_error() {
                tracing::debug!(error = %e, "Rejected contact submission");
            }
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.public_message().to_string(),
                }),
            )
                .into_response()
        }
    }
}
