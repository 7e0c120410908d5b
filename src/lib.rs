//! Forwarding HTTP proxy for MCP servers.
//!
//! Each proxy instance listens on its own port and relays requests to a
//! single backend whose base URL is resolved once at startup.

// Core subsystems
pub mod backend;
pub mod config;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use backend::BackendUrl;
pub use config::schema::{ProxyConfig, Settings};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
