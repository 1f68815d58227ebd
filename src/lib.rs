//! # contact-relay
//!
//! Relays contact-form submissions to the site owner's inbox through the
//! Gmail API, authenticating with an OAuth2 refresh token.
//!
//! ## Quick Start
//!
//! Set environment variables:
//! ```bash
//! GOOGLE_CLIENT_ID=xxxx.apps.googleusercontent.com
//! GOOGLE_CLIENT_SECRET=GOCSPX-xxxx
//! GOOGLE_REFRESH_TOKEN=1//xxxx
//! GMAIL_USER=owner@example.com
//! ```
//!
//! Mount the endpoint:
//! ```rust,ignore
//! use contact_relay::{server, Relay, RelayConfig};
//!
//! let relay = Relay::from_config(&RelayConfig::from_env()?)?;
//! let app = server::router(relay);
//! ```
//!
//! Or relay without HTTP:
//! ```rust,ignore
//! relay
//!     .handle(Some("application/json"), br#"{"mail":"a@b.com","message":"hi"}"#)
//!     .await?;
//! ```
//!
//! ## Pipeline
//!
//! Every submission is handled on its own, in order:
//!
//! 1. [`IncomingMessage::from_request`] checks content type, JSON shape and fields.
//!    Nothing below runs for invalid input.
//! 2. A [`TokenProvider`] exchanges the refresh token for a fresh [`AccessToken`].
//! 3. [`OutboundEmail`] renders the message (owner to owner) and encodes it as base64url.
//! 4. A [`MailSender`] submits it once. No retries.
//!
//! Any failure past step 1 reaches the visitor only as `"Failed to send message"`;
//! the detail goes to `tracing`.
//!
//! ## Feature Flags
//!
//! - `server` (default) - axum router, security headers and the `contact-relay` binary
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//! - `testing` - in-memory [`TokenProvider`]/[`MailSender`] doubles (`testing` module)
//!
//! ## Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `contact_relay_messages_total` | Counter | status | Relay attempts past validation |
//! | `contact_relay_relay_duration_seconds` | Histogram | | Token exchange plus send time |

/// The version of the contact-relay crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod compose;
mod config;
mod error;
mod message;
mod relay;
mod sender;
mod token;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(feature = "server")]
pub mod server;

// Re-exports
pub use compose::{compose, encode_base64url, escape_html, EncodedPayload, OutboundEmail};
pub use config::{Credentials, RelayConfig, GMAIL_API_URL, GOOGLE_TOKEN_URL};
pub use error::{RelayError, GENERIC_FAILURE};
pub use message::{
    is_json_content_type, IncomingMessage, CONTENT_TYPE_ERROR, INVALID_JSON_ERROR,
    NOT_AN_OBJECT_ERROR,
};
pub use relay::{build_email, Relay};
pub use sender::{GmailSender, MailSender, SendResult};
pub use token::{AccessToken, GoogleTokenProvider, TokenProvider};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::AccessToken;
    pub use crate::IncomingMessage;
    pub use crate::MailSender;
    pub use crate::OutboundEmail;
    pub use crate::Relay;
    pub use crate::RelayConfig;
    pub use crate::RelayError;
    pub use crate::TokenProvider;
}
