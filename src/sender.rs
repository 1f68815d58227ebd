//! Gmail API message submission.
//!
//! # Example
//!
//! ```rust,ignore
//! use contact_relay::{compose, AccessToken, GmailSender, MailSender};
//!
//! let sender = GmailSender::new();
//! let payload = compose("me@example.com", "me@example.com", "Hi", "Hello");
//! let result = sender.send(&AccessToken::new("ya29..."), &payload).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::compose::EncodedPayload;
use crate::config::{RelayConfig, GMAIL_API_URL};
use crate::error::RelayError;
use crate::token::AccessToken;

/// Result of a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    /// Message ID assigned by the provider
    pub message_id: Option<String>,
    /// Conversation thread the message was filed under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Submits encoded messages to a mail provider.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send one message. A single attempt; no retry.
    async fn send(
        &self,
        token: &AccessToken,
        payload: &EncodedPayload,
    ) -> Result<SendResult, RelayError>;

    /// Get the provider name (for logging/debugging).
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}

/// Gmail `users.messages.send` client.
pub struct GmailSender {
    client: Client,
    base_url: String,
}

impl GmailSender {
    /// Create a sender for the authenticated user's mailbox.
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: GMAIL_API_URL.to_string(),
        }
    }

    /// Create from a loaded config, sharing its HTTP client.
    pub fn from_config(config: &RelayConfig, client: Client) -> Self {
        Self::with_client(client).base_url(&config.api_url)
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for GmailSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailSender for GmailSender {
    async fn send(
        &self,
        token: &AccessToken,
        payload: &EncodedPayload,
    ) -> Result<SendResult, RelayError> {
        let url = format!("{}/messages/send", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", token.bearer())
            .header("Content-Type", "application/json")
            .header("User-Agent", format!("contact-relay/{}", crate::VERSION))
            .json(&GmailSendRequest {
                raw: payload.as_str(),
            })
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            // The message is accepted at this point; an odd body does not undo that.
            let result: GmailSendResponse = response.json().await.unwrap_or_default();
            Ok(SendResult {
                message_id: result.id,
                thread_id: result.thread_id,
            })
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(RelayError::ProviderSend {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn provider_name(&self) -> &'static str {
        "gmail"
    }
}

// ============================================================================
// Gmail API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GmailSendRequest<'a> {
    raw: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailSendResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    thread_id: Option<String>,
}
