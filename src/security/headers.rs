//! Outbound header preparation.
//!
//! # Responsibilities
//! - Copy inbound headers onto the backend request
//! - Drop `Host` so the backend sees its own authority, not the proxy's
//! - Strip hop-by-hop headers and the stale `Content-Length`
//! - Drop `Accept-Encoding`; bodies are decoded here, so they must arrive plain
//! - Force `Content-Type: application/json` when a body is sent

use axum::http::{
    header::{self, HeaderName},
    HeaderMap, HeaderValue,
};

/// Headers that describe the inbound connection or the original body framing,
/// plus the caller's encoding preferences.
const STRIPPED: [HeaderName; 11] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::ACCEPT_ENCODING,
    HeaderName::from_static("keep-alive"),
];

/// Build the outbound header set from the inbound headers.
pub fn outbound_headers(inbound: &HeaderMap, with_body: bool) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in &STRIPPED {
        headers.remove(name);
    }
    headers.remove("proxy-connection");

    if with_body {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }
    headers
}
