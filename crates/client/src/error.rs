//! Error taxonomy for ERPNext calls.
//!
//! Every failure is normalized into [`ErpError`]. The variant decides two
//! things: whether the retry wrapper may try again ([`ErpError::is_transient`])
//! and what a customer gets to read ([`ErpError::user_message`]). Raw server
//! internals stay in the `Display` output and the logs.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur when interacting with ERPNext.
#[derive(Debug, Error)]
pub enum ErpError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {message}")]
    Timeout {
        /// What timed out.
        message: String,
        /// Transport error, when the failure came from reqwest.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Connection refused, DNS failure or another network-level failure.
    #[error("Network error: {message}")]
    Network {
        /// What failed.
        message: String,
        /// Transport error, when the failure came from reqwest.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The document does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server answered with a body we could not decode, or a document
    /// lacks a required field.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Login was rejected.
    #[error("Authentication failed: {0}")]
    Auth(AuthFailure),

    /// The server rejected the request (validation, permissions, server
    /// exceptions).
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Best human-readable message extracted from the error payload.
        message: String,
        /// Python exception class reported by Frappe, if any.
        exc_type: Option<String>,
    },

    /// The client could not be configured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request could not be built or sent for a non-network reason.
    #[error("HTTP error: {0}")]
    Request(String),
}

/// Result type alias for `ErpError`.
pub type Result<T> = std::result::Result<T, ErpError>;

/// Map "not found" to `Ok(None)` for lookups where absence is a valid answer.
pub(crate) fn none_if_missing<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ErpError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

impl From<reqwest::Error> for ErpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                message: err.to_string(),
                source: Some(err),
            };
        }
        if err.is_connect() || err.is_request() || err.is_body() {
            return Self::Network {
                message: err.to_string(),
                source: Some(err),
            };
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Request(err.to_string())
    }
}

impl From<serde_json::Error> for ErpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl ErpError {
    /// Timeout without an underlying transport error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            source: None,
        }
    }

    /// Network failure without an underlying transport error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Whether retrying the same request can possibly succeed.
    ///
    /// Only connectivity problems qualify. Malformed bodies, validation
    /// errors and missing documents come back the same way every time.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }

    /// Whether the error means "the document does not exist".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// HTTP status the server answered with, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Message the server put in its error payload, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::NotFound(message) if !message.is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// Text suitable for showing to a customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => {
                "Unable to reach the store. Please check your internet connection and try again."
                    .to_string()
            }
            Self::NotFound(_) => "The requested item could not be found.".to_string(),
            Self::Decode(_) => {
                "The store returned an unexpected response. Please try again later.".to_string()
            }
            Self::Auth(failure) => failure.user_message().to_string(),
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            Self::Config(_) => "The app is not configured correctly.".to_string(),
            Self::Api { .. } | Self::Request(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

// =============================================================================
// Frappe Error Payloads
// =============================================================================

/// Error details from a Frappe error response body.
///
/// Frappe spreads the useful part of an error over several keys, and
/// `_server_messages` is a JSON string holding an array of JSON strings
/// holding objects. Every layer is decoded defensively: a layer that fails
/// to decode is kept as plain text rather than discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerErrorPayload {
    /// Top-level `message`.
    pub message: Option<String>,
    /// Python exception class (e.g. `DoesNotExistError`).
    pub exc_type: Option<String>,
    /// `exception` line (e.g. `frappe.exceptions.ValidationError: ...`).
    pub exception: Option<String>,
    /// Raw traceback from `exc`.
    pub exc: Option<String>,
    /// Messages decoded from `_server_messages`, HTML stripped.
    pub server_messages: Vec<String>,
}

impl ServerErrorPayload {
    /// Parse an error body. Non-JSON bodies yield an empty payload.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
            return Self::default();
        };

        let message = map.get("message").and_then(message_text);
        let exc_type = map.get("exc_type").and_then(non_empty_str);
        let exception = map.get("exception").and_then(non_empty_str);
        let exc = map.get("exc").and_then(non_empty_str);
        let server_messages = map
            .get("_server_messages")
            .map(decode_server_messages)
            .unwrap_or_default();

        Self {
            message,
            exc_type,
            exception,
            exc,
            server_messages,
        }
    }

    /// The most specific human-readable message available.
    ///
    /// Priority: `_server_messages`, then the text of `exception`, then
    /// `message`, then the exception class name.
    #[must_use]
    pub fn best_message(&self) -> Option<String> {
        if !self.server_messages.is_empty() {
            return Some(self.server_messages.join("; "));
        }
        if let Some(exception) = &self.exception {
            return Some(strip_exception_class(exception).to_string());
        }
        self.message.clone().or_else(|| self.exc_type.clone())
    }

    /// Whether Frappe reported a missing document.
    #[must_use]
    pub fn is_does_not_exist(&self) -> bool {
        self.exc_type.as_deref() == Some("DoesNotExistError")
            || self
                .exception
                .as_deref()
                .is_some_and(|e| e.contains("DoesNotExistError"))
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// `message` is usually a string but some endpoints nest an object.
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => non_empty_str(value).map(|s| strip_html(&s)),
        Value::Object(map) => map.get("message").and_then(message_text),
        _ => None,
    }
}

fn decode_server_messages(value: &Value) -> Vec<String> {
    let items = match value {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            // Not an encoded array: the string itself is the message
            _ => vec![value.clone()],
        },
        Value::Array(items) => items.clone(),
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(inner @ Value::Object(_)) => message_text(&inner),
                _ => non_empty_str(item).map(|s| strip_html(&s)),
            },
            Value::Object(_) => message_text(item),
            _ => None,
        })
        .filter(|m| !m.is_empty())
        .collect()
}

/// `frappe.exceptions.ValidationError: Qty must be positive` -> `Qty must be positive`
fn strip_exception_class(exception: &str) -> &str {
    match exception.split_once(": ") {
        Some((class, rest)) if !class.contains(' ') && !rest.trim().is_empty() => rest.trim(),
        _ => exception.trim(),
    }
}

/// Remove HTML tags from a server message.
fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

// =============================================================================
// Authentication Failure Classification
// =============================================================================

/// Why a login attempt failed, in customer terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Unknown user or wrong password.
    InvalidCredentials,
    /// The user exists but is disabled.
    AccountDisabled,
    /// The user may not sign in here.
    AccessDenied,
    /// The login endpoint does not exist on this server.
    ServiceNotFound,
    /// The server failed while processing the login.
    ServerError,
    /// The login request timed out.
    Timeout,
    /// The server could not be reached.
    Network,
    /// Nothing more specific is known.
    Unknown,
}

/// Substring rules applied to the server message, first match wins.
///
/// This is a best-effort heuristic: it depends on Frappe's English message
/// wording and breaks silently if a server translates or rewords them.
pub const AUTH_MESSAGE_RULES: &[(&str, AuthFailure)] = &[
    ("invalid login", AuthFailure::InvalidCredentials),
    ("incorrect password", AuthFailure::InvalidCredentials),
    ("invalid credentials", AuthFailure::InvalidCredentials),
    ("user disabled", AuthFailure::AccountDisabled),
    ("account disabled", AuthFailure::AccountDisabled),
    ("is disabled", AuthFailure::AccountDisabled),
    ("access denied", AuthFailure::AccessDenied),
    ("not permitted", AuthFailure::AccessDenied),
    ("not allowed", AuthFailure::AccessDenied),
];

impl AuthFailure {
    /// Text suitable for showing on the login screen.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email/phone or password.",
            Self::AccountDisabled => "This account has been disabled. Please contact support.",
            Self::AccessDenied => "Access denied. This account cannot sign in to the store.",
            Self::ServiceNotFound => "The login service is unavailable. Please try again later.",
            Self::ServerError => "The server encountered an error. Please try again later.",
            Self::Timeout => "The request timed out. Please check your connection and try again.",
            Self::Network => "Unable to connect. Please check your internet connection.",
            Self::Unknown => "Login failed. Please try again.",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

/// Classify a failed login call.
///
/// Priority: server message patterns, then HTTP status, then transport
/// failures, then `Unknown`. Servers sometimes answer with a misleading
/// status while the body names the real cause, so the message goes first.
#[must_use]
pub fn classify_auth_failure(error: &ErpError) -> AuthFailure {
    if let ErpError::Auth(failure) = error {
        return *failure;
    }

    if let Some(message) = error.server_message() {
        let lower = message.to_lowercase();
        if let Some((_, failure)) = AUTH_MESSAGE_RULES
            .iter()
            .find(|(pattern, _)| lower.contains(pattern))
        {
            return *failure;
        }
    }

    match error.status() {
        Some(401) => return AuthFailure::InvalidCredentials,
        Some(403) => return AuthFailure::AccessDenied,
        Some(404) => return AuthFailure::ServiceNotFound,
        Some(500) => return AuthFailure::ServerError,
        _ => {}
    }

    match error {
        ErpError::Timeout { .. } => AuthFailure::Timeout,
        ErpError::Network { .. } => AuthFailure::Network,
        _ => AuthFailure::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> ErpError {
        ErpError::Api {
            status,
            message: message.to_string(),
            exc_type: None,
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(ErpError::timeout("slow").is_transient());
        assert!(ErpError::network("refused").is_transient());
        assert!(!ErpError::Decode("bad json".to_string()).is_transient());
        assert!(!ErpError::NotFound("x".to_string()).is_transient());
        assert!(!api(417, "Qty required").is_transient());
    }

    #[test]
    fn test_user_messages() {
        assert!(
            ErpError::network("refused")
                .user_message()
                .contains("check your internet connection")
        );
        assert_eq!(api(417, "Qty required").user_message(), "Qty required");
        assert_eq!(
            api(500, "").user_message(),
            "Something went wrong. Please try again."
        );
    }

    #[test]
    fn test_parse_nested_server_messages() {
        let inner = serde_json::json!({"message": "<b>Item</b> SKU-9 is disabled", "indicator": "red"});
        let encoded = serde_json::to_string(&vec![inner.to_string()]).expect("encode");
        let body = serde_json::json!({
            "exc_type": "ValidationError",
            "_server_messages": encoded,
        })
        .to_string();

        let payload = ServerErrorPayload::parse(&body);
        assert_eq!(payload.server_messages, vec!["Item SKU-9 is disabled"]);
        assert_eq!(payload.best_message().as_deref(), Some("Item SKU-9 is disabled"));
    }

    #[test]
    fn test_parse_tolerates_broken_layers() {
        let body = r#"{"_server_messages": "[\"not json at all\", 42]", "message": "fallback"}"#;
        let payload = ServerErrorPayload::parse(body);
        assert_eq!(payload.server_messages, vec!["not json at all"]);

        let body = r#"{"_server_messages": "{{{", "message": "fallback"}"#;
        let payload = ServerErrorPayload::parse(body);
        assert_eq!(payload.server_messages, vec!["{{{"]);
    }

    #[test]
    fn test_parse_non_json_body() {
        let payload = ServerErrorPayload::parse("<html>502 Bad Gateway</html>");
        assert_eq!(payload, ServerErrorPayload::default());
        assert!(payload.best_message().is_none());
    }

    #[test]
    fn test_best_message_priority() {
        let body = r#"{
            "exception": "frappe.exceptions.ValidationError: Delivery date is required",
            "message": "generic",
            "exc_type": "ValidationError"
        }"#;
        let payload = ServerErrorPayload::parse(body);
        assert_eq!(
            payload.best_message().as_deref(),
            Some("Delivery date is required")
        );

        let payload = ServerErrorPayload::parse(r#"{"exc_type": "PermissionError"}"#);
        assert_eq!(payload.best_message().as_deref(), Some("PermissionError"));
    }

    #[test]
    fn test_does_not_exist_detection() {
        let payload = ServerErrorPayload::parse(
            r#"{"exc_type": "DoesNotExistError", "message": "Wishlist a@b.c not found"}"#,
        );
        assert!(payload.is_does_not_exist());
    }

    #[test]
    fn test_auth_message_beats_status() {
        // A 500 whose body says the password was wrong is a credentials problem
        let err = api(500, "Invalid Login. Please try again.");
        assert_eq!(classify_auth_failure(&err), AuthFailure::InvalidCredentials);

        let err = api(401, "User john@example.com is disabled");
        assert_eq!(classify_auth_failure(&err), AuthFailure::AccountDisabled);

        let err = api(200, "Access denied for this site");
        assert_eq!(classify_auth_failure(&err), AuthFailure::AccessDenied);
    }

    #[test]
    fn test_auth_status_fallback() {
        assert_eq!(
            classify_auth_failure(&api(401, "")),
            AuthFailure::InvalidCredentials
        );
        assert_eq!(classify_auth_failure(&api(403, "nope")), AuthFailure::AccessDenied);
        assert_eq!(
            classify_auth_failure(&ErpError::NotFound(String::new())),
            AuthFailure::ServiceNotFound
        );
        assert_eq!(classify_auth_failure(&api(500, "")), AuthFailure::ServerError);
        assert_eq!(classify_auth_failure(&api(502, "")), AuthFailure::Unknown);
    }

    #[test]
    fn test_auth_transport_fallback() {
        assert_eq!(
            classify_auth_failure(&ErpError::timeout("slow")),
            AuthFailure::Timeout
        );
        assert_eq!(
            classify_auth_failure(&ErpError::network("refused")),
            AuthFailure::Network
        );
        assert_eq!(
            classify_auth_failure(&ErpError::Decode("x".to_string())),
            AuthFailure::Unknown
        );
    }
}
