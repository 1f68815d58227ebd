//! The relay pipeline: validate, acquire a token, compose, send.
//!
//! Each call runs `Received → Validated → TokenAcquired → Composed → Sent`
//! and stops at the first failure. Nothing is shared between calls except the
//! immutable collaborators.

use std::sync::Arc;

#[cfg(feature = "metrics")]
use std::time::Instant;

use tracing::Instrument;

use crate::compose::OutboundEmail;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::message::IncomingMessage;
use crate::sender::{GmailSender, MailSender, SendResult};
use crate::token::{GoogleTokenProvider, TokenProvider};

/// Relays contact-form submissions to the site owner.
///
/// ```rust,ignore
/// use contact_relay::{Relay, RelayConfig};
///
/// let relay = Relay::from_config(&RelayConfig::from_env()?)?;
/// relay.handle(Some("application/json"), br#"{"mail":"a@b.com","message":"hi"}"#).await?;
/// ```
#[derive(Clone)]
pub struct Relay {
    owner: String,
    tokens: Arc<dyn TokenProvider>,
    sender: Arc<dyn MailSender>,
}

impl Relay {
    /// Create a relay from explicit collaborators.
    ///
    /// `owner` is both sender and recipient of every message.
    pub fn new(
        owner: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        sender: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            owner: owner.into(),
            tokens,
            sender,
        }
    }

    /// Wire up the Google token provider and Gmail sender from config.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = config.http_client()?;
        Ok(Self::new(
            config.credentials.sender_address.clone(),
            Arc::new(GoogleTokenProvider::from_config(config, client.clone())),
            Arc::new(GmailSender::from_config(config, client)),
        ))
    }

    /// The configured owner address.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Validate raw request parts, then relay.
    pub async fn handle(
        &self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<SendResult, RelayError> {
        let message = IncomingMessage::from_request(content_type, body)?;
        self.relay(&message).await
    }

    /// Relay an already validated message.
    pub async fn relay(&self, message: &IncomingMessage) -> Result<SendResult, RelayError> {
        let span = tracing::info_span!(
            "contact_relay.relay",
            from = %message.mail,
            token_provider = self.tokens.provider_name(),
            sender = self.sender.provider_name(),
        );

        #[cfg(feature = "metrics")]
        let start = Instant::now();

        let result = self.run(message).instrument(span.clone()).await;

        #[cfg(feature = "metrics")]
        {
            let duration = start.elapsed().as_secs_f64();
            let status = if result.is_ok() { "success" } else { "error" };
            metrics::counter!("contact_relay_messages_total", "status" => status).increment(1);
            metrics::histogram!("contact_relay_relay_duration_seconds").record(duration);
        }

        let _guard = span.enter();
        match &result {
            Ok(r) => tracing::info!(message_id = ?r.message_id, "Message relayed"),
            Err(e) => tracing::error!(error = %e, "Message relay failed"),
        }

        result
    }

    async fn run(&self, message: &IncomingMessage) -> Result<SendResult, RelayError> {
        let token = self.tokens.acquire_access_token().await?;
        tracing::debug!("Access token acquired");

        let payload = build_email(&self.owner, message).encode();
        tracing::debug!(bytes = payload.as_str().len(), "Message composed");

        self.sender.send(&token, &payload).await
    }
}

/// The email sent to the owner for a submission.
///
/// Sender and recipient are always `owner`; the visitor's identifier only
/// appears in the subject and body.
pub fn build_email(owner: &str, message: &IncomingMessage) -> OutboundEmail {
    OutboundEmail::new(owner, owner)
        .subject(format!("New message from {}", message.mail))
        .paragraph(&format!("From: {}", message.mail))
        .paragraph(&message.message)
}
