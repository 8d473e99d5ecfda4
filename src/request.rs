//! Request building: per-call options, descriptors, and body encoding

use std::collections::HashMap;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::errors::RestError;
use crate::types::{ContentKind, HttpMethod};

/// Per-call overrides applied on top of the client defaults
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Headers merged over the client defaults; per-call wins on collision
    pub headers: HashMap<String, String>,

    /// Explicit query parameters, merged with a query-flavored payload
    pub query: JsonMap<String, JsonValue>,

    /// Treat the payload as query parameters even on POST/PUT/PATCH
    pub is_query: bool,
}

/// Encoded request body, kept inspectable until dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedBody {
    Json(String),
    Text(String),
    /// One text part per payload key. The descriptor carries no
    /// `Content-Type` header in this case; the transport sets the
    /// boundary-bearing value.
    Multipart(Vec<(String, String)>),
}

/// A fully-specified request, ready for the transport
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<EncodedBody>,
}

/// Turn a logical call into a [`RequestDescriptor`].
///
/// Query-flavored calls (GET/DELETE, or `is_query`) absorb the payload into
/// the query string; the descriptor never carries both. Fails with
/// `Configuration` when `route` is empty, and with `UnsupportedContentType`
/// when a body is present under a content type the encoder does not know.
pub fn build(
    base_url: &str,
    default_headers: &HashMap<String, String>,
    route: &str,
    method: HttpMethod,
    payload: Option<JsonValue>,
    options: RequestOptions,
) -> Result<RequestDescriptor, RestError> {
    if route.is_empty() {
        return Err(RestError::Configuration("missing route".to_string()));
    }

    // Base and route are concatenated verbatim; slash discipline is the
    // caller's responsibility.
    let mut url = format!("{base_url}{route}");

    let RequestOptions {
        headers: header_overrides,
        mut query,
        is_query,
    } = options;

    let mut payload = match payload {
        Some(JsonValue::Null) | None => None,
        Some(value) => Some(value),
    };

    if method.is_query_flavored() || is_query {
        if let Some(value) = payload.take() {
            let JsonValue::Object(map) = value else {
                return Err(RestError::Configuration(
                    "query payload must be a JSON object".to_string(),
                ));
            };
            // Payload keys win over explicit query parameters.
            query.extend(map);
        }
    }

    if !query.is_empty() {
        let encoded = serde_qs::to_string(&query)?;
        url = format!("{url}?{encoded}");
    }

    let mut headers = default_headers.clone();
    headers.extend(header_overrides);

    let body = match payload {
        Some(value) if !is_empty_payload(&value) => Some(encode_body(&mut headers, value)?),
        _ => None,
    };

    Ok(RequestDescriptor {
        method,
        url,
        headers,
        body,
    })
}

/// `Null` and `{}` count as "no payload"; everything else is a body.
fn is_empty_payload(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn encode_body(
    headers: &mut HashMap<String, String>,
    payload: JsonValue,
) -> Result<EncodedBody, RestError> {
    let content_type = lookup_header(headers, "content-type").map(str::to_string);
    match ContentKind::resolve(content_type.as_deref()) {
        ContentKind::Json => Ok(EncodedBody::Json(serde_json::to_string(&payload)?)),
        ContentKind::Text => Ok(EncodedBody::Text(coerce_text(&payload))),
        ContentKind::Multipart => {
            let JsonValue::Object(map) = payload else {
                return Err(RestError::Configuration(
                    "multipart payload must be a JSON object".to_string(),
                ));
            };
            headers.retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
            let parts = map
                .into_iter()
                .map(|(name, value)| (name, coerce_text(&value)))
                .collect();
            Ok(EncodedBody::Multipart(parts))
        }
        ContentKind::Unsupported(name) => Err(RestError::UnsupportedContentType(name)),
    }
}

/// Strings pass through unchanged; everything else is rendered as JSON text.
fn coerce_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lookup_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://api.example.com";

    fn default_headers() -> HashMap<String, String> {
        HashMap::from([
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ])
    }

    #[test]
    fn test_url_is_base_plus_route_without_query() {
        let descriptor = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Get,
            None,
            RequestOptions::default(),
        )
        .unwrap();
        assert_eq!(descriptor.url, "https://api.example.com/users");
        assert!(descriptor.body.is_none());
    }

    #[test]
    fn test_empty_route_is_rejected() {
        let err = build(
            BASE,
            &default_headers(),
            "",
            HttpMethod::Get,
            None,
            RequestOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RestError::Configuration(_)));
    }

    #[test]
    fn test_get_payload_moves_into_query() {
        let descriptor = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Get,
            Some(json!({"active": true})),
            RequestOptions::default(),
        )
        .unwrap();
        assert_eq!(descriptor.url, "https://api.example.com/users?active=true");
        assert!(descriptor.body.is_none());
    }

    #[test]
    fn test_delete_payload_moves_into_query() {
        let descriptor = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Delete,
            Some(json!({"id": 7})),
            RequestOptions::default(),
        )
        .unwrap();
        assert_eq!(descriptor.url, "https://api.example.com/users?id=7");
        assert!(descriptor.body.is_none());
    }

    #[test]
    fn test_payload_wins_over_explicit_query() {
        let mut explicit = JsonMap::new();
        explicit.insert("page".to_string(), json!(1));
        explicit.insert("active".to_string(), json!(false));
        let descriptor = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Get,
            Some(json!({"active": true})),
            RequestOptions {
                query: explicit,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(descriptor.url.contains("active=true"));
        assert!(descriptor.url.contains("page=1"));
        assert!(!descriptor.url.contains("active=false"));
    }

    #[test]
    fn test_nested_query_uses_bracket_notation() {
        let descriptor = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Get,
            Some(json!({"filter": {"active": true}, "ids": [1, 2]})),
            RequestOptions::default(),
        )
        .unwrap();
        assert!(descriptor.url.contains("filter[active]=true"));
        assert!(descriptor.url.contains("ids[0]=1"));
        assert!(descriptor.url.contains("ids[1]=2"));
    }

    #[test]
    fn test_is_query_forces_query_treatment_on_post() {
        let descriptor = build(
            BASE,
            &default_headers(),
            "/search",
            HttpMethod::Post,
            Some(json!({"q": "ada"})),
            RequestOptions {
                is_query: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(descriptor.url, "https://api.example.com/search?q=ada");
        assert!(descriptor.body.is_none());
    }

    #[test]
    fn test_post_payload_becomes_json_body() {
        let descriptor = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Post,
            Some(json!({"name": "ada"})),
            RequestOptions::default(),
        )
        .unwrap();
        assert_eq!(
            descriptor.body,
            Some(EncodedBody::Json(r#"{"name":"ada"}"#.to_string()))
        );
        assert_eq!(
            descriptor.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_text_content_type_coerces_payload() {
        let mut options = RequestOptions::default();
        options
            .headers
            .insert("Content-Type".to_string(), "text/plain".to_string());
        let descriptor = build(
            BASE,
            &default_headers(),
            "/notes",
            HttpMethod::Post,
            Some(json!("hello")),
            options.clone(),
        )
        .unwrap();
        assert_eq!(descriptor.body, Some(EncodedBody::Text("hello".to_string())));

        let descriptor = build(
            BASE,
            &default_headers(),
            "/notes",
            HttpMethod::Post,
            Some(json!(42)),
            options,
        )
        .unwrap();
        assert_eq!(descriptor.body, Some(EncodedBody::Text("42".to_string())));
    }

    #[test]
    fn test_multipart_drops_content_type_header() {
        let mut options = RequestOptions::default();
        options
            .headers
            .insert("Content-Type".to_string(), "multipart/form-data".to_string());
        let descriptor = build(
            BASE,
            &default_headers(),
            "/upload",
            HttpMethod::Post,
            Some(json!({"name": "ada", "age": 36})),
            options,
        )
        .unwrap();
        assert!(!descriptor
            .headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case("content-type")));
        let Some(EncodedBody::Multipart(parts)) = descriptor.body else {
            panic!("expected multipart body");
        };
        assert_eq!(parts.len(), 2);
        assert!(parts.contains(&("name".to_string(), "ada".to_string())));
        assert!(parts.contains(&("age".to_string(), "36".to_string())));
    }

    #[test]
    fn test_unsupported_content_type_fails_build() {
        let mut options = RequestOptions::default();
        options
            .headers
            .insert("Content-Type".to_string(), "application/xml".to_string());
        let err = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Post,
            Some(json!({"name": "ada"})),
            options,
        )
        .unwrap_err();
        match err {
            RestError::UnsupportedContentType(name) => assert_eq!(name, "application/xml"),
            other => panic!("expected UnsupportedContentType, got {other:?}"),
        }
    }

    #[test]
    fn test_per_call_headers_win_over_defaults() {
        let mut options = RequestOptions::default();
        options
            .headers
            .insert("Accept".to_string(), "text/plain".to_string());
        options
            .headers
            .insert("X-Trace".to_string(), "abc".to_string());
        let descriptor = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Get,
            None,
            options,
        )
        .unwrap();
        assert_eq!(
            descriptor.headers.get("Accept").map(String::as_str),
            Some("text/plain")
        );
        assert_eq!(
            descriptor.headers.get("X-Trace").map(String::as_str),
            Some("abc")
        );
        assert_eq!(
            descriptor.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_null_and_empty_payloads_produce_no_body() {
        for payload in [Some(JsonValue::Null), Some(json!({})), None] {
            let descriptor = build(
                BASE,
                &default_headers(),
                "/users",
                HttpMethod::Post,
                payload,
                RequestOptions::default(),
            )
            .unwrap();
            assert!(descriptor.body.is_none());
        }
    }

    #[test]
    fn test_non_object_query_payload_is_rejected() {
        let err = build(
            BASE,
            &default_headers(),
            "/users",
            HttpMethod::Get,
            Some(json!([1, 2, 3])),
            RequestOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RestError::Configuration(_)));
    }
}
