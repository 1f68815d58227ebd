//! OAuth2 access token acquisition.
//!
//! Every relayed message gets a fresh token from a `refresh_token` grant.
//! Tokens are never cached or persisted; each call is one round trip to the
//! token endpoint.
//!
//! # Why `async_trait`?
//!
//! The relay holds its collaborators as `Arc<dyn TokenProvider>` so tests and
//! alternative deployments can swap them at runtime. Native async traits are
//! not object-safe; the boxed future is noise next to a network round trip.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::{Credentials, RelayConfig, GOOGLE_TOKEN_URL};
use crate::error::RelayError;

/// A short-lived bearer token.
///
/// Owned by a single request and dropped once the message is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// `Bearer <token>`
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Source of access tokens for the mail provider.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtain a new access token.
    async fn acquire_access_token(&self) -> Result<AccessToken, RelayError>;

    /// Get the provider name (for logging/debugging).
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}

/// Exchanges a Google refresh token for an access token.
pub struct GoogleTokenProvider {
    credentials: Credentials,
    client: Client,
    token_url: String,
}

impl GoogleTokenProvider {
    /// Create a provider using Google's token endpoint.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_client(credentials, Client::new())
    }

    /// Create with a custom reqwest client.
    pub fn with_client(credentials: Credentials, client: Client) -> Self {
        Self {
            credentials,
            client,
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Create from a loaded config, sharing its HTTP client.
    pub fn from_config(config: &RelayConfig, client: Client) -> Self {
        Self::with_client(config.credentials.clone(), client).token_url(&config.token_url)
    }

    /// Set a custom token endpoint (for testing).
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }
}

#[async_trait]
impl TokenProvider for GoogleTokenProvider {
    async fn acquire_access_token(&self) -> Result<AccessToken, RelayError> {
        self.credentials.validate()?;

        tracing::debug!(client_id = %self.credentials.client_id, "Exchanging refresh token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| RelayError::token_exchange(e.without_url().to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error: TokenErrorResponse = response.json().await.unwrap_or_default();
            let message = error
                .error_description
                .or(error.error)
                .unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!(status = status.as_u16(), error = %message, "Token endpoint rejected refresh");
            return Err(RelayError::token_exchange_with_status(
                message,
                status.as_u16(),
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            RelayError::token_exchange(format!("unreadable token response: {}", e.without_url()))
        })?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                tracing::debug!(expires_in = ?body.expires_in, "Access token acquired");
                Ok(AccessToken::new(token))
            }
            _ => Err(RelayError::token_exchange(
                "missing access_token in token response",
            )),
        }
    }

    fn provider_name(&self) -> &'static str {
        "google"
    }
}

// ============================================================================
// Token Endpoint Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}
