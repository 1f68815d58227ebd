//! Relay configuration loaded from the environment.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `GOOGLE_CLIENT_ID` | OAuth2 client ID |
//! | `GOOGLE_CLIENT_SECRET` | OAuth2 client secret |
//! | `GOOGLE_REFRESH_TOKEN` | Long-lived refresh token |
//! | `GMAIL_USER` | Site owner address, used as sender and recipient |
//! | `GOOGLE_TOKEN_URL` | Token endpoint override (optional) |
//! | `GMAIL_API_URL` | Gmail API base override (optional) |
//! | `RELAY_HTTP_TIMEOUT_SECS` | Outbound HTTP timeout (optional) |

use std::env;
use std::fmt;
use std::time::Duration;

use email_address::EmailAddress;

use crate::error::RelayError;

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Gmail API base for the authenticated user.
pub const GMAIL_API_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Long-lived OAuth2 credentials plus the site owner's address.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Sender and recipient of every relayed message.
    pub sender_address: String,
}

impl Credentials {
    /// Create credentials, checking that every field is present and the
    /// sender address is well formed.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        sender_address: impl Into<String>,
    ) -> Result<Self, RelayError> {
        let credentials = Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            sender_address: sender_address.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Verify required fields.
    pub fn validate(&self) -> Result<(), RelayError> {
        let fields = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("refresh_token", &self.refresh_token),
            ("sender_address", &self.sender_address),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(RelayError::Configuration(format!("{} is empty", name)));
            }
        }
        if !EmailAddress::is_valid(&self.sender_address) {
            return Err(RelayError::Configuration(format!(
                "'{}' is not a valid sender address",
                self.sender_address
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("sender_address", &self.sender_address)
            .finish()
    }
}

/// Everything the relay needs, validated once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub credentials: Credentials,
    pub token_url: String,
    pub api_url: String,
    /// Timeout for each outbound HTTP call. `None` keeps reqwest's default.
    pub http_timeout: Option<Duration>,
}

impl RelayConfig {
    /// Build a config with the default Google endpoints.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            api_url: GMAIL_API_URL.to_string(),
            http_timeout: None,
        }
    }

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using a custom variable lookup.
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use contact_relay::RelayConfig;
    ///
    /// let vars: HashMap<&str, &str> = [
    ///     ("GOOGLE_CLIENT_ID", "id"),
    ///     ("GOOGLE_CLIENT_SECRET", "secret"),
    ///     ("GOOGLE_REFRESH_TOKEN", "1//refresh"),
    ///     ("GMAIL_USER", "owner@example.com"),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let config = RelayConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
    /// assert_eq!(config.credentials.sender_address, "owner@example.com");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, RelayError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| RelayError::Configuration(format!("{} is not set", key)))
        };

        let credentials = Credentials::new(
            required("GOOGLE_CLIENT_ID")?,
            required("GOOGLE_CLIENT_SECRET")?,
            required("GOOGLE_REFRESH_TOKEN")?,
            required("GMAIL_USER")?,
        )?;

        let mut config = Self::new(credentials);

        if let Some(url) = lookup("GOOGLE_TOKEN_URL").filter(|v| !v.is_empty()) {
            config.token_url = url;
        }
        if let Some(url) = lookup("GMAIL_API_URL").filter(|v| !v.is_empty()) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("RELAY_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                RelayError::Configuration(format!(
                    "RELAY_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    secs
                ))
            })?;
            config.http_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Build the shared HTTP client used for both upstream calls.
    pub fn http_client(&self) -> Result<reqwest::Client, RelayError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("contact-relay/{}", crate::VERSION));
        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}
