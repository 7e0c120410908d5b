//! Backend subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     BackendConfig (env var name, default URL)
//!     → locator.rs (env override or default, once)
//!     → BackendUrl (immutable, injected into the Forwarder)
//!
//! Per request:
//!     InboundRequest + target path + method
//!     → forwarder.rs (build outbound request, issue it, buffer response)
//!     → UpstreamResponse | ProxyError::Transport
//! ```

pub mod forwarder;
pub mod locator;

pub use forwarder::Forwarder;
pub use locator::{resolve, BackendUrl};
