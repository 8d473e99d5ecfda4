//! Client configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::RestError;

/// Construction options for [`crate::RestClient`], layered over the defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Default headers merged over the JSON seed, overwriting on collision
    pub headers: HashMap<String, String>,

    /// Enables noisy request/response logging
    pub dev_mode: bool,

    /// Artificial wait applied before every dispatch
    pub simulated_delay: Duration,
}

/// Validated REST client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix for every request URL; routes are appended verbatim
    pub base_url: String,

    /// Default header mapping applied to every request
    pub headers: HashMap<String, String>,

    /// Artificial wait applied before every dispatch
    pub simulated_delay: Duration,

    /// Enables noisy request/response logging
    pub dev_mode: bool,
}

impl ClientConfig {
    /// Build a validated configuration. Fails when `base_url` is empty.
    pub fn new(base_url: impl Into<String>, options: ClientOptions) -> Result<Self, RestError> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(RestError::Configuration("missing base URL".to_string()));
        }
        let mut headers = default_headers();
        headers.extend(options.headers);
        Ok(Self {
            base_url,
            headers,
            simulated_delay: options.simulated_delay,
            dev_mode: options.dev_mode,
        })
    }
}

/// Header seed applied to every client: JSON out, JSON back
fn default_headers() -> HashMap<String, String> {
    HashMap::from([
        ("Accept".to_string(), "application/json".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ])
}
