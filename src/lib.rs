//! Minimal async REST client over reqwest
//!
//! This crate wraps an HTTP transport with fetch-like semantics: verb
//! methods build a request descriptor (method, full URL, merged headers,
//! content-type-driven body encoding), dispatch it, and normalize the raw
//! response into either a decoded `serde_json::Value` or a structured
//! [`RestError`]. A caller-overridable transform hook reshapes every
//! successful response before it is returned.
//!
//! There is deliberately no retry, caching, pooling configuration, or
//! timeout logic here; the client relies on the underlying transport.

pub mod client;
pub mod config;
pub mod errors;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types for convenience
pub use client::{RestClient, Transform};
pub use config::{ClientConfig, ClientOptions};
pub use errors::RestError;
pub use request::{EncodedBody, RequestDescriptor, RequestOptions};
pub use response::{normalize, RawResponse};
pub use types::{ContentKind, HttpMethod, HttpMethodError};
