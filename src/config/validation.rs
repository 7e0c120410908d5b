//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs, methods and route paths
//! - Detect duplicate instance names, bind addresses and route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::{ProxyConfig, Settings};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no proxy instances configured")]
    NoInstances,

    #[error("proxy name must not be empty")]
    EmptyName,

    #[error("duplicate proxy name '{0}'")]
    DuplicateName(String),

    #[error("{proxy}: invalid bind address '{address}'")]
    InvalidBindAddress { proxy: String, address: String },

    #[error("{proxy}: bind address '{address}' already used by another instance")]
    DuplicateBindAddress { proxy: String, address: String },

    #[error("{proxy}: backend env var must not be empty")]
    EmptyEnvVar { proxy: String },

    #[error("{proxy}: invalid backend url '{url}': {reason}")]
    InvalidBackendUrl {
        proxy: String,
        url: String,
        reason: String,
    },

    #[error("{proxy}: route '{route}' path '{path}' must start with '/'")]
    InvalidPath {
        proxy: String,
        route: String,
        path: String,
    },

    #[error("{proxy}: route '{route}' has invalid method '{method}'")]
    InvalidMethod {
        proxy: String,
        route: String,
        method: String,
    },

    #[error("{proxy}: duplicate route name '{route}'")]
    DuplicateRoute { proxy: String, route: String },

    #[error("{proxy}: max_body_bytes must be greater than zero")]
    ZeroBodyLimit { proxy: String },

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate the full settings tree.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.proxies.is_empty() {
        errors.push(ValidationError::NoInstances);
    }

    let observability = &settings.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    let mut names = HashSet::new();
    let mut addresses = HashSet::new();
    for proxy in &settings.proxies {
        if !proxy.name.is_empty() && !names.insert(proxy.name.as_str()) {
            errors.push(ValidationError::DuplicateName(proxy.name.clone()));
        }
        if let Ok(addr) = proxy.listener.bind_address.parse::<SocketAddr>() {
            if addr.port() != 0 && !addresses.insert(addr) {
                errors.push(ValidationError::DuplicateBindAddress {
                    proxy: proxy.name.clone(),
                    address: proxy.listener.bind_address.clone(),
                });
            }
        }
        errors.extend(validate_proxy(proxy));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single proxy instance.
pub fn validate_proxy(proxy: &ProxyConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = proxy.name.clone();

    if proxy.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if proxy.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            proxy: name.clone(),
            address: proxy.listener.bind_address.clone(),
        });
    }

    if proxy.backend.env_var.trim().is_empty() {
        errors.push(ValidationError::EmptyEnvVar { proxy: name.clone() });
    }

    if let Err(reason) = check_backend_url(&proxy.backend.default_url) {
        errors.push(ValidationError::InvalidBackendUrl {
            proxy: name.clone(),
            url: proxy.backend.default_url.clone(),
            reason,
        });
    }

    if proxy.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit { proxy: name.clone() });
    }

    let mut route_names = HashSet::new();
    for route in &proxy.routes.prefixes {
        if !route_names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute {
                proxy: name.clone(),
                route: route.name.clone(),
            });
        }
        check_path(&mut errors, &name, &route.name, &route.prefix);
    }

    for route in &proxy.routes.shortcuts {
        if !route_names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute {
                proxy: name.clone(),
                route: route.name.clone(),
            });
        }
        check_path(&mut errors, &name, &route.name, &route.path);
        check_method(&mut errors, &name, &route.name, &route.method);
        if let Some(path) = &route.target_path {
            check_path(&mut errors, &name, &route.name, path);
        }
        if let Some(method) = &route.target_method {
            check_method(&mut errors, &name, &route.name, method);
        }
    }

    for op in &proxy.usage {
        check_path(&mut errors, &name, &op.name, &op.path);
        if op.method != "ANY" {
            check_method(&mut errors, &name, &op.name, &op.method);
        }
    }

    errors
}

/// The backend must be an absolute plain-HTTP URL without query or fragment.
pub fn check_backend_url(raw: &str) -> Result<(), String> {
    let url = url::Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}

fn check_path(errors: &mut Vec<ValidationError>, proxy: &str, route: &str, path: &str) {
    if !path.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            proxy: proxy.to_string(),
            route: route.to_string(),
            path: path.to_string(),
        });
    }
}

fn check_method(errors: &mut Vec<ValidationError>, proxy: &str, route: &str, method: &str) {
    if method.is_empty() || Method::from_bytes(method.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidMethod {
            proxy: proxy.to_string(),
            route: route.to_string(),
            method: method.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::config::schema::ShortcutRouteConfig;

    #[test]
    fn test_both_presets_validate_together() {
        let settings = Settings {
            proxies: vec![presets::github(), presets::docker()],
            ..Default::default()
        };
        assert_eq!(validate_settings(&settings), Ok(()));
    }

    #[test]
    fn test_metrics_address_checked_when_enabled() {
        let mut settings = Settings {
            proxies: vec![presets::github()],
            ..Default::default()
        };
        settings.observability.metrics_address = "not-an-address".into();
        assert_eq!(validate_settings(&settings), Ok(()));

        settings.observability.metrics_enabled = true;
        assert_eq!(
            validate_settings(&settings),
            Err(vec![ValidationError::InvalidMetricsAddress("not-an-address".into())])
        );
    }

    #[test]
    fn test_empty_settings_rejected() {
        let errors = validate_settings(&Settings::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoInstances]);
    }

    #[test]
    fn test_duplicate_instances_reported() {
        let settings = Settings {
            proxies: vec![presets::github(), presets::github()],
            ..Default::default()
        };
        let errors = validate_settings(&settings).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateName("github-mcp-http-proxy".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateBindAddress { .. })));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = presets::github();
        config.listener.bind_address = "nowhere".into();
        config.backend.default_url = "https://localhost:3001".into();
        config.routes.shortcuts.push(ShortcutRouteConfig {
            name: "broken".into(),
            method: "GE T".into(),
            path: "tools".into(),
            target_method: None,
            target_path: None,
        });

        let errors = validate_proxy(&config);
        assert_eq!(errors.len(), 4, "{:?}", errors);
    }

    #[test]
    fn test_backend_url_rules() {
        assert!(check_backend_url("http://localhost:3001").is_ok());
        assert!(check_backend_url("http://backend.internal/base").is_ok());
        assert!(check_backend_url("localhost:3001").is_err());
        assert!(check_backend_url("ftp://localhost").is_err());
        assert!(check_backend_url("http://localhost:3001/?x=1").is_err());
    }
}
