//! Response normalization: success decoding and failure classification

use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::errors::RestError;

/// The transport-level facts a response is judged on
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Option<String>,
}

impl RawResponse {
    /// Capture a reqwest response. Reading the body is a transport operation
    /// and can itself fail.
    pub async fn capture(response: reqwest::Response) -> Result<Self, RestError> {
        let status = response.status();
        let status_text = status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string();
        let text = response.text().await?;
        Ok(Self {
            status: status.as_u16(),
            status_text,
            body: if text.is_empty() { None } else { Some(text) },
        })
    }

    /// Mirrors fetch's `ok`: true for any 2xx status.
    pub fn ok(&self) -> bool {
        StatusCode::from_u16(self.status)
            .map(|status| status.is_success())
            .unwrap_or(false)
    }
}

/// Classify a raw response into a decoded success value or a [`RestError`].
///
/// A 204 yields `{}` and its body is never parsed. Any other success must
/// carry valid JSON; malformed JSON is a `Decode` failure, not swallowed.
/// Failures decode their body best-effort for diagnostics and surface as
/// `Http` errors.
pub fn normalize(raw: RawResponse) -> Result<JsonValue, RestError> {
    if raw.ok() {
        if raw.status == StatusCode::NO_CONTENT.as_u16() {
            return Ok(json!({}));
        }
        let text = raw.body.unwrap_or_default();
        Ok(serde_json::from_str(&text)?)
    } else {
        debug!(status = raw.status, status_text = %raw.status_text, "classifying failure response");
        let body = raw
            .body
            .as_deref()
            .and_then(|text| serde_json::from_str(text).ok())
            .unwrap_or(JsonValue::Null);
        Err(RestError::http(raw.status, Some(raw.status_text), body))
    }
}
