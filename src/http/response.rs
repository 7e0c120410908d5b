//! Relaying upstream responses to the caller.
//!
//! # Responsibilities
//! - Classify the upstream body once: structured (JSON) or opaque
//! - Re-emit JSON bodies as JSON, opaque bodies byte-for-byte
//! - Always keep the upstream status code, content type and content encoding
//!
//! # Design Decisions
//! - Upstream 4xx/5xx are passed through, never rewritten to 500
//! - A body that claims JSON but does not parse is a proxy error (500)
//! - Empty bodies are relayed opaquely regardless of content type
//! - Encoded (compressed) bodies are never decoded, only relayed

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CONTENT_ENCODING, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::http::error::ProxyError;
use crate::http::request::is_structured;

/// What the backend sent back, unmodified.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub content_encoding: Option<HeaderValue>,
    pub body: Bytes,
}

/// Upstream body after content-type classification.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Structured(Value),
    Opaque(Bytes),
}

impl UpstreamResponse {
    /// Classify the body by its declared content type.
    pub fn decode_body(&self) -> Result<UpstreamBody, ProxyError> {
        if self.body.is_empty() || self.is_encoded() || !is_structured(self.content_type.as_ref()) {
            return Ok(UpstreamBody::Opaque(self.body.clone()));
        }
        serde_json::from_slice(&self.body)
            .map(UpstreamBody::Structured)
            .map_err(ProxyError::MalformedUpstreamBody)
    }

    /// True when the body carries a content coding other than `identity`.
    pub fn is_encoded(&self) -> bool {
        self.content_encoding
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| !v.trim().eq_ignore_ascii_case("identity"))
    }
}

/// Write the upstream response back to the caller with its original status.
pub fn relay(upstream: UpstreamResponse) -> Result<Response, ProxyError> {
    let mut response = match upstream.decode_body()? {
        UpstreamBody::Structured(value) => (upstream.status, Json(value)).into_response(),
        UpstreamBody::Opaque(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = upstream.status;
            if let Some(encoding) = upstream.content_encoding {
                response.headers_mut().insert(CONTENT_ENCODING, encoding);
            }
            response
        }
    };
    // `Json` writes a bare `application/json`; keep the backend's own label.
    if let Some(content_type) = upstream.content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}
