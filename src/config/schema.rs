//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root settings: process-wide observability plus one entry per proxy instance.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Observability settings shared by all instances.
    pub observability: ObservabilityConfig,

    /// Proxy instances, each fronting one backend on its own port.
    #[serde(rename = "proxy")]
    pub proxies: Vec<ProxyConfig>,
}

/// Configuration for a single forwarding proxy instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Service identifier used in health output, logs and metrics.
    pub name: String,

    /// Human-readable service name for the description endpoint.
    pub display_name: String,

    /// Version reported by the description endpoint.
    pub version: String,

    /// Free-form description reported by the description endpoint.
    pub description: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream backend location.
    pub backend: BackendConfig,

    /// Route table definition.
    pub routes: RoutesConfig,

    /// Documented backend operations, listed by `GET /`.
    pub usage: Vec<OperationDoc>,

    /// Inbound request limits.
    pub limits: LimitsConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            name: "mcp-http-proxy".to_string(),
            display_name: "MCP HTTP Proxy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "HTTP proxy for an MCP server".to_string(),
            listener: ListenerConfig::default(),
            backend: BackendConfig::default(),
            routes: RoutesConfig::default(),
            usage: Vec::new(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3002").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where the backend lives.
///
/// The environment variable wins when set and non-empty; otherwise
/// `default_url` is used. Resolved once at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Environment variable holding the backend base URL.
    pub env_var: String,

    /// Fallback base URL (e.g., "http://localhost:3001").
    pub default_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            env_var: "MCP_URL".to_string(),
            default_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Route table definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutesConfig {
    /// Generic namespace routes forwarded as-is.
    pub prefixes: Vec<PrefixRouteConfig>,

    /// Fixed (method, path) routes with a fixed backend target.
    pub shortcuts: Vec<ShortcutRouteConfig>,
}

/// Catch-all forwarding for every path under `prefix`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrefixRouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match (segment-aware).
    pub prefix: String,

    /// Forward only the remainder below the prefix instead of the full path.
    #[serde(default)]
    pub strip_prefix: bool,
}

/// A fixed inbound (method, path) mapped to a fixed backend operation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShortcutRouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Inbound method to match.
    pub method: String,

    /// Inbound path to match (exact).
    pub path: String,

    /// Backend method; defaults to the inbound method.
    #[serde(default)]
    pub target_method: Option<String>,

    /// Backend path; defaults to the inbound path.
    #[serde(default)]
    pub target_path: Option<String>,
}

/// A documented backend operation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OperationDoc {
    pub name: String,
    pub method: String,
    pub path: String,
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
