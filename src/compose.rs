//! Message composition and base64url transport encoding.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

/// RFC 5322 line limit, excluding the CRLF.
const MAX_LINE_LEN: usize = 998;

/// Room for body text on one line, leaving space for `<p>` and `<br>`/`</p>`.
const BODY_WRAP_WIDTH: usize = MAX_LINE_LEN - "<p>".len() - "</p>".len() - 1;

/// Raw bytes per RFC 2047 encoded word: 45 bytes become 60 base64
/// characters, which with `=?UTF-8?B?` and `?=` stays within 75.
const ENCODED_WORD_BYTES: usize = 45;

/// An HTML email ready to be encoded for the provider's `raw` field.
///
/// ```
/// use contact_relay::OutboundEmail;
///
/// let email = OutboundEmail::new("owner@example.com", "owner@example.com")
///     .subject("New message from visitor@example.com")
///     .paragraph("From: visitor@example.com")
///     .paragraph("Hello there");
///
/// let text = email.to_rfc2822();
/// assert!(text.contains("Subject: New message from visitor@example.com\r\n"));
/// assert!(text.ends_with("<p>From: visitor@example.com</p>\r\n<p>Hello there</p>"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Email subject line
    pub subject: String,
    /// Rendered HTML body (already escaped)
    pub html_body: String,
}

impl OutboundEmail {
    /// Create an email between two addresses with an empty body.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Append a `<p>` paragraph of plain text.
    ///
    /// The text is HTML-escaped and each line break (CRLF, LF or a lone CR)
    /// becomes `<br>` followed by a real CRLF. Other control characters
    /// except tab become spaces, and lines are wrapped to stay within 998
    /// bytes.
    pub fn paragraph(mut self, text: &str) -> Self {
        if !self.html_body.is_empty() {
            self.html_body.push_str("\r\n");
        }
        self.html_body.push_str("<p>");
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.html_body.push_str("<br>\r\n");
            }
            push_wrapped(&mut self.html_body, line);
        }
        self.html_body.push_str("</p>");
        self
    }

    /// Render the header block, a blank line and the HTML body, joined by CRLF.
    pub fn to_rfc2822(&self) -> String {
        [
            format!("From: {}", header_value(&self.from)),
            format!("To: {}", header_value(&self.to)),
            format!("Subject: {}", encode_subject(&header_value(&self.subject))),
            "Content-Type: text/html; charset=utf-8".to_string(),
            String::new(),
            self.html_body.clone(),
        ]
        .join("\r\n")
    }

    /// Render and transport-encode the message.
    pub fn encode(&self) -> EncodedPayload {
        EncodedPayload::from_bytes(self.to_rfc2822().as_bytes())
    }
}

/// A base64url-encoded message, the value of the provider's `raw` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    /// Encode arbitrary bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(encode_base64url(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compose a single-paragraph HTML email and encode it.
///
/// Pure string formatting; never fails.
pub fn compose(from: &str, to: &str, subject: &str, body_text: &str) -> EncodedPayload {
    OutboundEmail::new(from, to)
        .subject(subject)
        .paragraph(body_text)
        .encode()
}

/// Base64 with `+`→`-`, `/`→`_` and no trailing `=`.
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Escape text for embedding in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match html_entity(c) {
            Some(entity) => escaped.push_str(entity),
            None => escaped.push(c),
        }
    }
    escaped
}

fn html_entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape one line of body text and append it, breaking before
/// [`BODY_WRAP_WIDTH`] bytes. Breaks replace the last space on the line when
/// there is one, so the rendered HTML is unchanged.
fn push_wrapped(out: &mut String, line: &str) {
    let mut current = String::new();
    let mut buf = [0u8; 4];
    for c in line.chars() {
        let piece = match html_entity(c) {
            Some(entity) => entity,
            None if c != '\t' && c.is_ascii_control() => " ",
            None => &*c.encode_utf8(&mut buf),
        };

        while current.len() + piece.len() > BODY_WRAP_WIDTH {
            match current.rfind(' ') {
                Some(at) if at > 0 => {
                    let rest = current.split_off(at + 1);
                    current.pop();
                    out.push_str(&current);
                    out.push_str("\r\n");
                    current = rest;
                }
                _ => {
                    out.push_str(&current);
                    out.push_str("\r\n");
                    current.clear();
                }
            }
        }
        current.push_str(piece);
    }
    out.push_str(&current);
}

/// Header values never span lines or carry control characters.
fn header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect()
}

/// Plain ASCII subjects that fit on one line are written as-is. Anything
/// else becomes RFC 2047 `B` encoded words of at most 75 characters, folded
/// onto continuation lines.
fn encode_subject(value: &str) -> String {
    if value.is_ascii() && "Subject: ".len() + value.len() <= MAX_LINE_LEN {
        return value.to_string();
    }

    let mut words = Vec::new();
    let mut start = 0;
    while start < value.len() {
        let mut end = (start + ENCODED_WORD_BYTES).min(value.len());
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        words.push(format!(
            "=?UTF-8?B?{}?=",
            STANDARD.encode(&value.as_bytes()[start..end])
        ));
        start = end;
    }
    words.join("\r\n ")
}
