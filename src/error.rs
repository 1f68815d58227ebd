//! Error types for contact-relay.

use thiserror::Error;

/// Message shown to visitors for every failure past input validation.
pub const GENERIC_FAILURE: &str = "Failed to send message";

/// Errors that can occur while relaying a contact-form message.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    /// Malformed or missing client input.
    #[error("{0}")]
    Validation(String),

    /// Configuration error (missing env var, invalid value, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The OAuth2 refresh exchange failed or returned no usable token.
    #[error("Token exchange failed: {message}")]
    TokenExchange {
        message: String,
        /// HTTP status from the token endpoint, if it answered
        status: Option<u16>,
    },

    /// The mail provider rejected the send.
    #[error("Provider rejected message ({status}): {body}")]
    ProviderSend { status: u16, body: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl RelayError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a token exchange error without an upstream status.
    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::TokenExchange {
            message: message.into(),
            status: None,
        }
    }

    /// Create a token exchange error with HTTP status.
    pub fn token_exchange_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::TokenExchange {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Whether the failure was caused by the visitor's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Text that is safe to return to the visitor.
    ///
    /// Validation messages are passed through; everything else collapses to
    /// [`GENERIC_FAILURE`] so credentials and upstream responses stay in the logs.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            _ => GENERIC_FAILURE,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL: reqwest includes it in Display and it may carry query secrets.
        Self::Http(err.without_url().to_string())
    }
}
