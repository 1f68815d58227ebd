//! In-memory collaborators for tests.
//!
//! Both doubles count their invocations so tests can assert that invalid
//! input never reaches the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use contact_relay::testing::{RecordingSender, StaticTokenProvider};
//! use contact_relay::Relay;
//!
//! let tokens = Arc::new(StaticTokenProvider::new("tok123"));
//! let sender = Arc::new(RecordingSender::new());
//! let relay = Relay::new("owner@example.com", tokens.clone(), sender.clone());
//!
//! // ... drive the relay ...
//!
//! assert_eq!(tokens.calls(), 1);
//! assert_eq!(sender.sent()[0].token.secret(), "tok123");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;

use crate::compose::EncodedPayload;
use crate::error::RelayError;
use crate::sender::{MailSender, SendResult};
use crate::token::{AccessToken, TokenProvider};

/// Hands out a fixed token, or a fixed error.
pub struct StaticTokenProvider {
    outcome: Result<AccessToken, RelayError>,
    calls: AtomicUsize,
}

impl StaticTokenProvider {
    /// Always succeed with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            outcome: Ok(AccessToken::new(token)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: RelayError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of tokens requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn acquire_access_token(&self) -> Result<AccessToken, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}

/// A message captured by [`RecordingSender`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub token: AccessToken,
    pub payload: EncodedPayload,
}

impl SentMessage {
    /// The RFC 2822 text behind the payload.
    ///
    /// # Panics
    ///
    /// Panics if the payload is not valid base64url-encoded UTF-8.
    pub fn decoded(&self) -> String {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.payload.as_str())
            .expect("payload is not base64url");
        String::from_utf8(bytes).expect("payload is not UTF-8")
    }
}

/// Records every send attempt; accepts or rejects them all.
pub struct RecordingSender {
    sent: Mutex<Vec<SentMessage>>,
    reject_with: Option<RelayError>,
}

impl RecordingSender {
    /// Accept every message.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_with: None,
        }
    }

    /// Record, then fail every message with `error`.
    pub fn rejecting(error: RelayError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_with: Some(error),
        }
    }

    /// All attempts so far, oldest first.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Number of send attempts so far.
    pub fn calls(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Default for RecordingSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailSender for RecordingSender {
    async fn send(
        &self,
        token: &AccessToken,
        payload: &EncodedPayload,
    ) -> Result<SendResult, RelayError> {
        let id = {
            let mut sent = self.sent.lock();
            sent.push(SentMessage {
                token: token.clone(),
                payload: payload.clone(),
            });
            sent.len()
        };

        match &self.reject_with {
            Some(error) => Err(error.clone()),
            None => Ok(SendResult {
                message_id: Some(format!("recorded-{}", id)),
                thread_id: None,
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}
