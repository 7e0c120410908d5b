//! Request forwarding to the backend.
//!
//! # Responsibilities
//! - Build the outbound request: base URL + target path, sanitized headers
//! - Serialize the inbound JSON body for write methods
//! - Issue the call and buffer the upstream status, content type and body
//!
//! # Design Decisions
//! - Single shot: no retries, retry policy belongs to the caller
//! - No internal timeout; a hung backend only blocks its own request
//! - No interpretation of the payload; that is the relayer's job

use axum::{
    body::Body,
    http::{
        header::{CONTENT_ENCODING, CONTENT_TYPE},
        Method, Request, Uri,
    },
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::Value;

use crate::backend::locator::BackendUrl;
use crate::http::error::ProxyError;
use crate::http::request::{is_retrieval, InboundRequest};
use crate::http::response::UpstreamResponse;
use crate::security::headers::outbound_headers;

/// Forwards inbound requests to one immutable backend.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    backend: BackendUrl,
}

impl Forwarder {
    pub fn new(backend: BackendUrl) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, backend }
    }

    pub fn backend(&self) -> &BackendUrl {
        &self.backend
    }

    /// Construct the outbound request without sending it.
    pub fn build_request(
        &self,
        inbound: &InboundRequest,
        target: &str,
        method: &Method,
    ) -> Result<Request<Body>, ProxyError> {
        let url = self.backend.join(target);
        let uri: Uri = url.parse().map_err(|e: axum::http::uri::InvalidUri| {
            ProxyError::InvalidTarget {
                target: url.clone(),
                reason: e.to_string(),
            }
        })?;

        let body = if is_retrieval(method) {
            None
        } else {
            let value = inbound
                .body
                .clone()
                .unwrap_or_else(|| Value::Object(Default::default()));
            Some(serde_json::to_vec(&value).map_err(|e| ProxyError::Dispatch(e.to_string()))?)
        };

        let headers = outbound_headers(&inbound.headers, body.is_some());

        let mut request = Request::new(body.map(Body::from).unwrap_or_else(Body::empty));
        *request.method_mut() = method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }

    /// Forward and buffer the backend's response.
    pub async fn forward(
        &self,
        inbound: &InboundRequest,
        target: &str,
        method: &Method,
    ) -> Result<UpstreamResponse, ProxyError> {
        let request = self.build_request(inbound, target, method)?;
        let uri = request.uri().clone();

        tracing::debug!(method = %method, target = %uri, "Forwarding to backend");

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ProxyError::transport(&e))?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(|e| ProxyError::transport(&e))?;

        tracing::debug!(
            method = %method,
            target = %uri,
            status = parts.status.as_u16(),
            bytes = body.len(),
            "Backend responded"
        );

        Ok(UpstreamResponse {
            status: parts.status,
            content_type: parts.headers.get(CONTENT_TYPE).cloned(),
            content_encoding: parts.headers.get(CONTENT_ENCODING).cloned(),
            body,
        })
    }
}
