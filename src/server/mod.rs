//! HTTP surface: `POST /api/mail` behind the site's security headers.
//!
//! # Example
//!
//! ```rust,ignore
//! use contact_relay::{server, Relay, RelayConfig};
//!
//! let relay = Relay::from_config(&RelayConfig::from_env()?)?;
//! let app = server::router(relay);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/api/mail` | Relay `{ "mail": ..., "message": ... }` to the owner |
//!
//! ## Responses
//!
//! | Condition | Status | Body |
//! |-----------|--------|------|
//! | Success | 200 | `{ "status": "success" }` |
//! | Invalid input | 400 | `{ "error": "<what is wrong>" }` |
//! | Token or provider failure | 400 | `{ "error": "Failed to send message" }` |

mod routes;
mod security_headers;

use axum::Router;

use crate::relay::Relay;

pub use routes::{ErrorResponse, SuccessResponse, MAX_BODY_BYTES};
pub use security_headers::{default_csp, SecurityHeaders, CONNECT_SRC_HOSTS};

/// Create the router with the default security headers.
pub fn router(relay: Relay) -> Router {
    router_with_headers(relay, &SecurityHeaders::default())
}

/// Create the router with a custom header policy.
pub fn router_with_headers(relay: Relay, headers: &SecurityHeaders) -> Router {
    headers.apply(routes::create_router(relay))
}
