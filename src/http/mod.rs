//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → routing (RouteTable decides local answer or forward plan)
//!     → local.rs (health, service description)      [local routes]
//!     → request.rs (decode inbound body)             [forwarded routes]
//!     → backend::Forwarder (issue outbound request)
//!     → response.rs (relay JSON or opaque body with upstream status)
//!     → Send to client
//!
//! Any failure along the way:
//!     → error.rs (ProxyError → JSON error envelope)
//! ```

pub mod error;
pub mod local;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ErrorEnvelope, ProxyError};
pub use request::InboundRequest;
pub use response::{relay, UpstreamBody, UpstreamResponse};
pub use server::{AppState, HttpServer, X_REQUEST_ID};
