//! Backend base URL resolution.
//!
//! # Responsibilities
//! - Read the configured environment override
//! - Fall back to the configured default when it is unset or blank
//! - Produce an immutable `BackendUrl` shared by the forwarder and local routes
//!
//! # Design Decisions
//! - Resolved exactly once at startup; never re-read at request time
//! - No error path: a missing override is the expected default case
//! - A malformed override is still used as given, with a startup warning

use std::fmt;
use std::sync::Arc;

use crate::config::validation::check_backend_url;
use crate::config::BackendConfig;

/// Resolved backend base URL without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUrl(Arc<str>);

impl BackendUrl {
    pub fn new(url: impl AsRef<str>) -> Self {
        Self(Arc::from(url.as_ref().trim().trim_end_matches('/')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Same rules as the configured default: absolute `http` URL with a host.
    pub fn check(&self) -> Result<(), String> {
        check_backend_url(&self.0)
    }

    /// Concatenate a target path (with optional query) onto the base.
    pub fn join(&self, target: &str) -> String {
        if target.starts_with('/') {
            format!("{}{}", self.0, target)
        } else {
            format!("{}/{}", self.0, target)
        }
    }
}

impl fmt::Display for BackendUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    Environment,
    Default,
}

/// Resolve the backend URL from the process environment.
pub fn resolve(config: &BackendConfig) -> BackendUrl {
    resolve_with(config, |key| std::env::var(key).ok()).0
}

/// Resolve the backend URL using an arbitrary variable lookup.
pub fn resolve_with<F>(config: &BackendConfig, lookup: F) -> (BackendUrl, UrlSource)
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(&config.env_var) {
        Some(value) if !value.trim().is_empty() => {
            let url = BackendUrl::new(value);
            tracing::info!(env_var = %config.env_var, url = %url, "Backend URL taken from environment");
            if let Err(reason) = url.check() {
                tracing::warn!(
                    env_var = %config.env_var,
                    url = %url,
                    reason = %reason,
                    "Backend override is not a usable http URL; forwarded requests will fail"
                );
            }
            (url, UrlSource::Environment)
        }
        _ => {
            tracing::debug!(
                env_var = %config.env_var,
                url = %config.default_url,
                "Backend override not set, using default"
            );
            (BackendUrl::new(&config.default_url), UrlSource::Default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            env_var: "GITHUB_MCP_URL".into(),
            default_url: "http://localhost:3001".into(),
        }
    }

    #[test]
    fn test_env_override_wins() {
        let (url, source) = resolve_with(&config(), |key| {
            assert_eq!(key, "GITHUB_MCP_URL");
            Some("http://github-mcp:9000/".into())
        });
        assert_eq!(url.as_str(), "http://github-mcp:9000");
        assert_eq!(source, UrlSource::Environment);
    }

    #[test]
    fn test_missing_override_falls_back() {
        let (url, source) = resolve_with(&config(), |_| None);
        assert_eq!(url.as_str(), "http://localhost:3001");
        assert_eq!(source, UrlSource::Default);
    }

    #[test]
    fn test_blank_override_falls_back() {
        let (url, source) = resolve_with(&config(), |_| Some("   ".into()));
        assert_eq!(url.as_str(), "http://localhost:3001");
        assert_eq!(source, UrlSource::Default);
    }

    #[test]
    fn test_unusable_override_kept_but_flagged() {
        let (url, source) = resolve_with(&config(), |_| Some("https://github-mcp:9000".into()));
        assert_eq!(source, UrlSource::Environment);
        assert_eq!(url.as_str(), "https://github-mcp:9000");
        assert!(url.check().is_err());

        let (url, _) = resolve_with(&config(), |_| Some("github-mcp:9000".into()));
        assert!(url.check().is_err());

        let (url, _) = resolve_with(&config(), |_| None);
        assert!(url.check().is_ok());
    }

    #[test]
    fn test_join_keeps_query() {
        let url = BackendUrl::new("http://localhost:3001");
        assert_eq!(
            url.join("/mcp/github/repos?x=1"),
            "http://localhost:3001/mcp/github/repos?x=1"
        );
        assert_eq!(url.join("tools/call"), "http://localhost:3001/tools/call");
    }
}
