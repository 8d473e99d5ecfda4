//! Error types for the REST client

use serde_json::Value as JsonValue;

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Invalid query parameters: {0}")]
    Query(#[from] serde_qs::Error),

    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP {status} {status_text}: {message}")]
    Http {
        status: u16,
        status_text: String,
        message: String,
        /// Best-effort decoded response body, `Null` when absent or
        /// undecodable.
        body: JsonValue,
    },
}

impl RestError {
    /// Build an `Http` error from a failure response. The message falls back
    /// to the status text when none is supplied.
    pub fn http(status: u16, message: Option<String>, body: JsonValue) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        let message = match message {
            Some(m) if !m.is_empty() => m,
            _ => status_text.clone(),
        };
        RestError::Http {
            status,
            status_text,
            message,
            body,
        }
    }

    /// The HTTP status code, for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
