//! Security headers applied to every response.
//!
//! The defaults are the site's fixed policy:
//!
//! | Header | Value |
//! |--------|-------|
//! | `Content-Security-Policy` | `default-src 'none'; connect-src 'self' https://oauth2.googleapis.com https://gmail.googleapis.com; ...` |
//! | `Referrer-Policy` | `origin-when-cross-origin` |
//! | `X-Frame-Options` | `DENY` |
//! | `X-Content-Type-Options` | `nosniff` |
//! | `X-DNS-Prefetch-Control` | `on` |
//! | `Strict-Transport-Security` | `max-age=31536000; includeSubDomains; preload` |
//! | `Permissions-Policy` | `camera=(), microphone=(), geolocation=()` |
//!
//! # Example
//!
//! ```rust,ignore
//! use contact_relay::server::SecurityHeaders;
//!
//! let app = SecurityHeaders::default().apply(axum::Router::new());
//! ```

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

/// Hosts the relay talks to; the only `connect-src` origins besides `'self'`.
pub const CONNECT_SRC_HOSTS: [&str; 2] = [
    "https://oauth2.googleapis.com",
    "https://gmail.googleapis.com",
];

/// Default Content-Security-Policy.
pub fn default_csp() -> String {
    format!(
        "default-src 'none'; connect-src 'self' {}; font-src 'self'; img-src 'self'; \
         script-src 'self' 'unsafe-inline'; style-src 'self'",
        CONNECT_SRC_HOSTS.join(" ")
    )
}

/// Response header policy.
///
/// Each field is `None` to leave the header unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeaders {
    pub content_security_policy: Option<String>,
    pub referrer_policy: Option<String>,
    pub frame_options: Option<String>,
    /// `X-Content-Type-Options: nosniff`
    pub content_type_options: bool,
    pub dns_prefetch_control: Option<String>,
    pub strict_transport_security: Option<String>,
    pub permissions_policy: Option<String>,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            content_security_policy: Some(default_csp()),
            referrer_policy: Some("origin-when-cross-origin".to_string()),
            frame_options: Some("DENY".to_string()),
            content_type_options: true,
            dns_prefetch_control: Some("on".to_string()),
            strict_transport_security: Some(
                "max-age=31536000; includeSubDomains; preload".to_string(),
            ),
            permissions_policy: Some("camera=(), microphone=(), geolocation=()".to_string()),
        }
    }
}

impl SecurityHeaders {
    /// All headers disabled.
    pub fn none() -> Self {
        Self {
            content_security_policy: None,
            referrer_policy: None,
            frame_options: None,
            content_type_options: false,
            dns_prefetch_control: None,
            strict_transport_security: None,
            permissions_policy: None,
        }
    }

    /// Set the Content-Security-Policy header.
    pub fn with_csp(mut self, policy: impl Into<String>) -> Self {
        self.content_security_policy = Some(policy.into());
        self
    }

    /// Set the Strict-Transport-Security header, or drop it (plain HTTP in development).
    pub fn with_hsts(mut self, value: Option<String>) -> Self {
        self.strict_transport_security = value;
        self
    }

    /// Header pairs to emit. Values that are not valid header text are skipped.
    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let entries = [
            ("content-security-policy", self.content_security_policy.as_deref()),
            ("referrer-policy", self.referrer_policy.as_deref()),
            ("x-frame-options", self.frame_options.as_deref()),
            (
                "x-content-type-options",
                self.content_type_options.then_some("nosniff"),
            ),
            ("x-dns-prefetch-control", self.dns_prefetch_control.as_deref()),
            (
                "strict-transport-security",
                self.strict_transport_security.as_deref(),
            ),
            ("permissions-policy", self.permissions_policy.as_deref()),
        ];

        entries
            .into_iter()
            .filter_map(|(name, value)| {
                let value = value?;
                match HeaderValue::from_str(value) {
                    Ok(v) => Some((HeaderName::from_static(name), v)),
                    Err(_) => {
                        tracing::warn!(header = name, "Skipping invalid security header value");
                        None
                    }
                }
            })
            .collect()
    }

    /// Wrap every response of `router`, replacing any value a handler set.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.headers()
            .into_iter()
            .fold(router, |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::overriding(name, value))
            })
    }
}
