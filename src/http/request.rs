//! Inbound request decoding.
//!
//! # Responsibilities
//! - Capture method, URI and headers of the inbound request
//! - Decode JSON bodies on write methods (retrieval methods carry no body)
//! - Reject bodies that declare JSON but do not parse
//! - Report bodies that outgrow the size limit mid-stream as too large
//!
//! # Design Decisions
//! - Declared lengths are capped by the server's limit layer; streamed
//!   bodies are capped again while buffering
//! - Non-JSON bodies are not decoded and count as absent

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method, Request, Uri},
};
use http_body_util::LengthLimitError;
use serde_json::Value;

use crate::http::error::ProxyError;

/// A decoded inbound request, consumed by one forward.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Present only for write methods with a JSON body.
    pub body: Option<Value>,
}

impl InboundRequest {
    /// Read and decode an inbound request, buffering at most `limit` body bytes.
    pub async fn read(request: Request<Body>, limit: usize) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();

        let body = if is_retrieval(&parts.method) {
            None
        } else {
            let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
                if exceeds_limit(&e) {
                    ProxyError::PayloadTooLarge { limit }
                } else {
                    ProxyError::InvalidRequestBody(e.to_string())
                }
            })?;
            decode_body(parts.headers.get(CONTENT_TYPE), &bytes)?
        };

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
    }

    /// Path plus query string, as received.
    pub fn path_and_query(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| self.uri.path())
    }
}

/// Retrieval methods are forwarded without a body.
pub fn is_retrieval(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// True when the content type names JSON (`application/json` or `*+json`).
pub fn is_structured(content_type: Option<&HeaderValue>) -> bool {
    let Some(value) = content_type.and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// True when a body error was caused by a length limit, at any depth.
fn exceeds_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

fn decode_body(content_type: Option<&HeaderValue>, bytes: &[u8]) -> Result<Option<Value>, ProxyError> {
    if !is_structured(content_type) || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| ProxyError::InvalidRequestBody(e.to_string()))
}
