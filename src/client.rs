//! REST client façade: verb methods, dispatch, and the transform hook

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::{ClientConfig, ClientOptions};
use crate::errors::RestError;
use crate::request::{self, EncodedBody, RequestDescriptor, RequestOptions};
use crate::response::{self, RawResponse};
use crate::types::HttpMethod;

/// Hook applied to every successfully decoded response, exactly once
pub type Transform = Arc<dyn Fn(JsonValue) -> JsonValue + Send + Sync>;

/// Minimal async REST client with fetch-like semantics
///
/// Verb methods build a [`RequestDescriptor`], dispatch it through a shared
/// `reqwest::Client`, and normalize the outcome into a decoded
/// `serde_json::Value` or a [`RestError`]. No retries, no caching, no
/// client-side timeouts.
#[derive(Clone)]
pub struct RestClient {
    config: ClientConfig,
    client: Client,
    transform: Transform,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a client for `base_url`. Fails when the base URL is empty.
    pub fn new(base_url: impl Into<String>, options: ClientOptions) -> Result<Self, RestError> {
        Self::with_config(ClientConfig::new(base_url, options)?)
    }

    /// Create a client from an already-validated configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, RestError> {
        debug!(base_url = %config.base_url, "creating REST client");
        let client = Client::builder().build()?;
        Ok(Self {
            config,
            client,
            transform: Arc::new(|data| data),
        })
    }

    /// Replace the transform hook applied to every successful response,
    /// e.g. to unwrap an envelope.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(JsonValue) -> JsonValue + Send + Sync + 'static,
    {
        self.transform = Arc::new(transform);
        self
    }

    /// Replace the transform hook on an existing client.
    pub fn set_transform<F>(&mut self, transform: F) -> &mut Self
    where
        F: Fn(JsonValue) -> JsonValue + Send + Sync + 'static,
    {
        self.transform = Arc::new(transform);
        self
    }

    /// Merge `headers` into the persistent defaults (overwriting on
    /// collision) and return the client for chaining. Per-call headers still
    /// win over these.
    pub fn update_headers(&mut self, headers: HashMap<String, String>) -> &mut Self {
        let mut merged = self.config.headers.clone();
        merged.extend(headers);
        self.config.headers = merged;
        self
    }

    /// The current default header mapping.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.config.headers
    }

    pub async fn get(
        &self,
        route: &str,
        query: Option<JsonValue>,
        options: Option<RequestOptions>,
    ) -> Result<JsonValue, RestError> {
        self.dispatch(route, HttpMethod::Get, query, options.unwrap_or_default())
            .await
    }

    pub async fn post(
        &self,
        route: &str,
        body: Option<JsonValue>,
        options: Option<RequestOptions>,
    ) -> Result<JsonValue, RestError> {
        self.dispatch(route, HttpMethod::Post, body, options.unwrap_or_default())
            .await
    }

    pub async fn put(
        &self,
        route: &str,
        body: Option<JsonValue>,
        options: Option<RequestOptions>,
    ) -> Result<JsonValue, RestError> {
        self.dispatch(route, HttpMethod::Put, body, options.unwrap_or_default())
            .await
    }

    pub async fn patch(
        &self,
        route: &str,
        body: Option<JsonValue>,
        options: Option<RequestOptions>,
    ) -> Result<JsonValue, RestError> {
        self.dispatch(route, HttpMethod::Patch, body, options.unwrap_or_default())
            .await
    }

    pub async fn delete(
        &self,
        route: &str,
        query: Option<JsonValue>,
        options: Option<RequestOptions>,
    ) -> Result<JsonValue, RestError> {
        self.dispatch(route, HttpMethod::Delete, query, options.unwrap_or_default())
            .await
    }

    async fn dispatch(
        &self,
        route: &str,
        method: HttpMethod,
        payload: Option<JsonValue>,
        options: RequestOptions,
    ) -> Result<JsonValue, RestError> {
        let descriptor = request::build(
            &self.config.base_url,
            &self.config.headers,
            route,
            method,
            payload,
            options,
        )?;

        if self.config.dev_mode {
            debug!(?descriptor, "built request descriptor");
        }

        if !self.config.simulated_delay.is_zero() {
            debug!(delay_ms = self.config.simulated_delay.as_millis() as u64, "simulating latency");
            tokio::time::sleep(self.config.simulated_delay).await;
        }

        debug!(method = %descriptor.method, url = %descriptor.url, "sending request");
        let response = self.execute(descriptor).await?;
        let raw = RawResponse::capture(response).await?;
        debug!(status = raw.status, "response received");

        match response::normalize(raw) {
            Ok(value) => Ok((self.transform)(value)),
            Err(err) => {
                if self.config.dev_mode {
                    warn!(error = %err, "request failed");
                }
                Err(err)
            }
        }
    }

    async fn execute(&self, descriptor: RequestDescriptor) -> Result<reqwest::Response, RestError> {
        let mut request = self
            .client
            .request(descriptor.method.into(), &descriptor.url);
        for (name, value) in &descriptor.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match descriptor.body {
            Some(EncodedBody::Json(text)) | Some(EncodedBody::Text(text)) => request.body(text),
            Some(EncodedBody::Multipart(parts)) => {
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in parts {
                    form = form.text(name, value);
                }
                request.multipart(form)
            }
            None => request,
        };
        Ok(request.send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_headers_merges_and_chains() {
        let mut client = RestClient::new("https://api.example.com", ClientOptions::default())
            .unwrap();
        client
            .update_headers(HashMap::from([(
                "X-Test".to_string(),
                "1".to_string(),
            )]))
            .update_headers(HashMap::from([(
                "Accept".to_string(),
                "text/plain".to_string(),
            )]));

        assert_eq!(client.headers().get("X-Test").map(String::as_str), Some("1"));
        assert_eq!(
            client.headers().get("Accept").map(String::as_str),
            Some("text/plain")
        );
        // Previously set defaults survive the merge.
        assert_eq!(
            client.headers().get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_missing_base_url_is_a_configuration_error() {
        let err = RestClient::new("", ClientOptions::default()).unwrap_err();
        assert!(matches!(err, RestError::Configuration(_)));
    }
}
