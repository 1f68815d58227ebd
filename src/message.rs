//! Visitor payload parsing and validation.
//!
//! Everything here runs before any network call, so a malformed request can
//! never trigger a token exchange or a send.

use mime::Mime;
use serde_json::{Map, Value};

use crate::error::RelayError;

pub const CONTENT_TYPE_ERROR: &str = "Content-Type must be application/json";
pub const INVALID_JSON_ERROR: &str = "Invalid JSON payload";
pub const NOT_AN_OBJECT_ERROR: &str = "Payload must be a JSON object";

/// A validated contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// How the visitor identified themselves (usually an email address).
    pub mail: String,
    /// Message text.
    pub message: String,
}

impl IncomingMessage {
    /// Validate raw request parts.
    ///
    /// Checks, in order: JSON content type, parseable body, object shape,
    /// then each field.
    ///
    /// ```
    /// use contact_relay::IncomingMessage;
    ///
    /// let msg = IncomingMessage::from_request(
    ///     Some("application/json"),
    ///     br#"{"mail":"a@b.com","message":"hi"}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(msg.mail, "a@b.com");
    ///
    /// assert!(IncomingMessage::from_request(Some("text/plain"), b"{}").is_err());
    /// ```
    pub fn from_request(content_type: Option<&str>, body: &[u8]) -> Result<Self, RelayError> {
        if !content_type.is_some_and(is_json_content_type) {
            return Err(RelayError::validation(CONTENT_TYPE_ERROR));
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|_| RelayError::validation(INVALID_JSON_ERROR))?;

        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, RelayError> {
        let object = value
            .as_object()
            .ok_or_else(|| RelayError::validation(NOT_AN_OBJECT_ERROR))?;

        let mail = required_string(object, "mail")?;
        let message = required_string(object, "message")?;

        if mail.contains(['\r', '\n']) {
            return Err(RelayError::validation(
                "Field 'mail' must not contain line breaks",
            ));
        }

        Ok(Self {
            mail: mail.trim().to_string(),
            message: message.to_string(),
        })
    }
}

fn required_string<'a>(
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, RelayError> {
    let value = object.get(field).and_then(Value::as_str).ok_or_else(|| {
        RelayError::validation(format!(
            "Field '{}' is required and must be a string",
            field
        ))
    })?;

    if value.trim().is_empty() {
        return Err(RelayError::validation(format!(
            "Field '{}' must not be empty",
            field
        )));
    }

    Ok(value)
}

/// `application/json`, with or without parameters, or any `application/*+json`.
pub fn is_json_content_type(content_type: &str) -> bool {
    match content_type.trim().to_ascii_lowercase().parse::<Mime>() {
        Ok(m) => {
            m.type_() == mime::APPLICATION
                && (m.subtype() == mime::JSON || m.suffix().is_some_and(|s| s == mime::JSON))
        }
        Err(_) => false,
    }
}
