//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors (permissive cross-origin acceptance, preflight answered here)
//!     → Pass to routing
//!
//! Outgoing backend request:
//!     → headers.rs (drop Host and hop-by-hop headers, force JSON type)
//! ```
//!
//! # Design Decisions
//! - Browser callers are never blocked: any origin, method and header
//! - No authentication; the proxy is a transparent relay

pub mod headers;

use tower_http::cors::CorsLayer;

/// Cross-origin policy applied to every inbound request.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
