//! Built-in proxy profiles.
//!
//! Two instances ship with the proxy: one fronting the GitHub MCP server and
//! one fronting the Docker MCP server. Both can run in the same process
//! because their listen ports do not overlap.

use crate::config::schema::{
    BackendConfig, LimitsConfig, ListenerConfig, OperationDoc, PrefixRouteConfig, ProxyConfig,
    RoutesConfig, ShortcutRouteConfig,
};

/// Selectable built-in profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Github,
    Docker,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Github, Profile::Docker];

    /// Build the configuration for this profile.
    pub fn config(self) -> ProxyConfig {
        match self {
            Profile::Github => github(),
            Profile::Docker => docker(),
        }
    }
}

/// GitHub MCP proxy: `:3002` → `GITHUB_MCP_URL` (default `http://localhost:3001`).
pub fn github() -> ProxyConfig {
    ProxyConfig {
        name: "github-mcp-http-proxy".to_string(),
        display_name: "GitHub MCP HTTP Proxy".to_string(),
        version: "1.0.0".to_string(),
        description: "HTTP proxy for GitHub MCP Server".to_string(),
        listener: ListenerConfig {
            bind_address: "0.0.0.0:3002".to_string(),
        },
        backend: BackendConfig {
            env_var: "GITHUB_MCP_URL".to_string(),
            default_url: "http://localhost:3001".to_string(),
        },
        routes: RoutesConfig {
            prefixes: vec![PrefixRouteConfig {
                name: "github".to_string(),
                prefix: "/mcp/github".to_string(),
                strip_prefix: false,
            }],
            shortcuts: vec![
                shortcut("analysis", "GET", "/mcp/github/analysis"),
                shortcut("tools_call", "POST", "/tools/call"),
            ],
        },
        usage: vec![
            op("analysis", "GET", "/mcp/github/analysis"),
            op("tools_call", "POST", "/tools/call"),
            op("github_api", "ANY", "/mcp/github/*"),
        ],
        limits: LimitsConfig::default(),
    }
}

/// Docker MCP proxy: `:3004` → `DOCKER_MCP_URL` (default `http://localhost:3003`).
///
/// Everything under `/api` is forwarded with the `/api` mount point removed.
pub fn docker() -> ProxyConfig {
    ProxyConfig {
        name: "docker-mcp-http-proxy".to_string(),
        display_name: "Docker MCP HTTP Proxy".to_string(),
        version: "1.0.0".to_string(),
        description: "HTTP proxy for Docker MCP Server".to_string(),
        listener: ListenerConfig {
            bind_address: "0.0.0.0:3004".to_string(),
        },
        backend: BackendConfig {
            env_var: "DOCKER_MCP_URL".to_string(),
            default_url: "http://localhost:3003".to_string(),
        },
        routes: RoutesConfig {
            prefixes: vec![PrefixRouteConfig {
                name: "api".to_string(),
                prefix: "/api".to_string(),
                strip_prefix: true,
            }],
            shortcuts: Vec::new(),
        },
        usage: vec![
            op("init", "POST", "/api/mcp/docker/init"),
            op("containers", "GET", "/api/mcp/docker/containers"),
            op("images", "GET", "/api/mcp/docker/images"),
            op("create_container", "POST", "/api/mcp/docker/container/create"),
            op("start_container", "POST", "/api/mcp/docker/container/start"),
            op("stop_container", "POST", "/api/mcp/docker/container/stop"),
            op("remove_container", "DELETE", "/api/mcp/docker/container/remove"),
            op("container_logs", "GET", "/api/mcp/docker/container/logs/:containerId"),
            op("container_inspect", "GET", "/api/mcp/docker/container/inspect/:containerId"),
            op("container_exec", "POST", "/api/mcp/docker/container/exec"),
            op("pull_image", "POST", "/api/mcp/docker/image/pull"),
            op("system_info", "GET", "/api/mcp/docker/system/info"),
            op("health_check", "GET", "/api/mcp/docker/health"),
        ],
        limits: LimitsConfig::default(),
    }
}

fn shortcut(name: &str, method: &str, path: &str) -> ShortcutRouteConfig {
    ShortcutRouteConfig {
        name: name.to_string(),
        method: method.to_string(),
        path: path.to_string(),
        target_method: None,
        target_path: None,
    }
}

fn op(name: &str, method: &str, path: &str) -> OperationDoc {
    OperationDoc {
        name: name.to_string(),
        method: method.to_string(),
        path: path.to_string(),
    }
}
