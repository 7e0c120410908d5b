//! Proxy-level failures and the JSON error envelope.
//!
//! Every failure is terminal at the request boundary: it maps to exactly one
//! response of the shape `{ "success": false, "error": ..., "details": ... }`.
//! Upstream-reported failures are not errors here; they are relayed as-is.

use std::any::Any;

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure produced by the proxy itself.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Backend unreachable: connection refused, DNS failure, broken response.
    #[error("failed to reach backend: {0}")]
    Transport(String),

    /// Backend declared JSON but the body does not parse.
    #[error("backend sent malformed JSON: {0}")]
    MalformedUpstreamBody(#[source] serde_json::Error),

    /// The outbound URL could not be formed from base URL and path.
    #[error("invalid upstream target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Inbound body exceeded the configured size limit while streaming.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Inbound body declared JSON but could not be read or decoded.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    #[error("no route for {method} {path}")]
    NoRoute { method: Method, path: String },

    /// Unexpected fault (panic) inside the dispatch path.
    #[error("internal proxy error: {0}")]
    Dispatch(String),
}

impl ProxyError {
    /// Build a transport error from a client error, keeping its cause chain.
    pub fn transport(err: &(dyn std::error::Error + 'static)) -> Self {
        ProxyError::Transport(error_chain(err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::NoRoute { .. } => StatusCode::NOT_FOUND,
            ProxyError::Transport(_)
            | ProxyError::MalformedUpstreamBody(_)
            | ProxyError::InvalidTarget { .. }
            | ProxyError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short error code written into the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::Transport(_) => "Failed to proxy request to backend",
            ProxyError::MalformedUpstreamBody(_) => "Malformed upstream response",
            ProxyError::InvalidTarget { .. } => "Invalid upstream target",
            ProxyError::PayloadTooLarge { .. } => "Request body too large",
            ProxyError::InvalidRequestBody(_) => "Invalid request body",
            ProxyError::NoRoute { .. } => "Route not found",
            ProxyError::Dispatch(_) => "Internal proxy error",
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Transport(_) => "transport",
            ProxyError::MalformedUpstreamBody(_) => "malformed_upstream_body",
            ProxyError::InvalidTarget { .. } => "invalid_target",
            ProxyError::PayloadTooLarge { .. } => "payload_too_large",
            ProxyError::InvalidRequestBody(_) => "invalid_request_body",
            ProxyError::NoRoute { .. } => "no_route",
            ProxyError::Dispatch(_) => "dispatch",
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let details = match self {
            ProxyError::Transport(cause) => Some(cause.clone()),
            ProxyError::MalformedUpstreamBody(e) => Some(e.to_string()),
            ProxyError::InvalidTarget { reason, .. } => Some(reason.clone()),
            ProxyError::PayloadTooLarge { limit } => Some(format!("limit is {} bytes", limit)),
            ProxyError::InvalidRequestBody(reason) => Some(reason.clone()),
            ProxyError::NoRoute { method, path } => Some(format!("{} {}", method, path)),
            // Panic payloads stay in the logs.
            ProxyError::Dispatch(_) => None,
        };
        ErrorEnvelope {
            success: false,
            error: self.code().to_string(),
            details,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// Fixed-shape JSON body for every proxy-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Convert a panic caught at the server boundary into the 500 envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %message, "Request handler panicked");
    ProxyError::Dispatch(message).into_response()
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
