//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile route configuration into an ordered table
//! - Look up the route for a (method, path) pair
//! - Compute the backend method and target for forwarded routes
//! - Summarize the table for the service-description endpoint
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Ordered by precedence: local > shortcut > prefix (longest first)
//! - First match wins; explicit no-match rather than silent default

use std::cmp::Reverse;

use axum::http::{Method, Uri};
use thiserror::Error;

use crate::config::RoutesConfig;
use crate::routing::matcher::{
    AndMatcher, ExactPathMatcher, Matcher, MethodMatcher, PathPrefixMatcher,
};

const LOCAL_PRIORITY: u32 = 300;
const SHORTCUT_PRIORITY: u32 = 200;
const PREFIX_PRIORITY: u32 = 100;

/// Error compiling the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route '{route}' has invalid method '{method}'")]
    InvalidMethod { route: String, method: String },
}

/// What a matched route does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Answer `GET /health` locally.
    Health,
    /// Answer `GET /` locally.
    Describe,
    /// Forward to the backend.
    Forward(ForwardPlan),
}

/// Backend method and target (path plus optional query) for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPlan {
    pub method: Method,
    pub target: String,
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub name: &'a str,
    pub action: RouteAction,
}

/// One line of the route summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub name: String,
    pub method: String,
    pub path: String,
}

#[derive(Debug)]
enum RouteKind {
    Health,
    Describe,
    Shortcut { method: Method, path: String },
    Prefix { matcher: PathPrefixMatcher, strip: bool },
}

#[derive(Debug)]
struct Route {
    name: String,
    priority: u32,
    specificity: usize,
    matcher: Box<dyn Matcher>,
    kind: RouteKind,
    summary: RouteSummary,
}

/// Immutable, ordered route table for one proxy instance.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile routes from configuration. Local routes are always present.
    pub fn from_config(config: &RoutesConfig) -> Result<Self, RouteError> {
        let mut routes = vec![
            local("health", "/health", RouteKind::Health),
            local("describe", "/", RouteKind::Describe),
        ];

        for shortcut in &config.shortcuts {
            let method = parse_method(&shortcut.name, &shortcut.method)?;
            let target_method = match &shortcut.target_method {
                Some(m) => parse_method(&shortcut.name, m)?,
                None => method.clone(),
            };
            let target_path = shortcut
                .target_path
                .clone()
                .unwrap_or_else(|| shortcut.path.clone());

            routes.push(Route {
                name: shortcut.name.clone(),
                priority: SHORTCUT_PRIORITY,
                specificity: shortcut.path.len(),
                matcher: Box::new(AndMatcher::new(vec![
                    Box::new(MethodMatcher::new(method.clone())),
                    Box::new(ExactPathMatcher::new(shortcut.path.clone())),
                ])),
                kind: RouteKind::Shortcut {
                    method: target_method,
                    path: target_path,
                },
                summary: RouteSummary {
                    name: shortcut.name.clone(),
                    method: method.to_string(),
                    path: shortcut.path.clone(),
                },
            });
        }

        for prefix in &config.prefixes {
            let matcher = PathPrefixMatcher::new(prefix.prefix.clone());
            routes.push(Route {
                name: prefix.name.clone(),
                priority: PREFIX_PRIORITY,
                specificity: matcher.prefix().len(),
                matcher: Box::new(matcher.clone()),
                summary: RouteSummary {
                    name: prefix.name.clone(),
                    method: "ANY".to_string(),
                    path: format!("{}/*", matcher.prefix()),
                },
                kind: RouteKind::Prefix {
                    matcher,
                    strip: prefix.strip_prefix,
                },
            });
        }

        // Stable: equal keys keep configuration order.
        routes.sort_by_key(|r| Reverse((r.priority, r.specificity)));

        Ok(Self { routes })
    }

    /// Find the route for a request, or `None` when nothing matches.
    pub fn resolve(&self, method: &Method, uri: &Uri) -> Option<RouteMatch<'_>> {
        let path = uri.path();
        let route = self.routes.iter().find(|r| r.matcher.matches(method, path))?;

        let action = match &route.kind {
            RouteKind::Health => RouteAction::Health,
            RouteKind::Describe => RouteAction::Describe,
            RouteKind::Shortcut { method, path } => RouteAction::Forward(ForwardPlan {
                method: method.clone(),
                target: path.clone(),
            }),
            RouteKind::Prefix { matcher, strip } => {
                let forwarded = if *strip { matcher.remainder(path) } else { path };
                let target = match uri.query() {
                    Some(query) => format!("{}?{}", forwarded, query),
                    None => forwarded.to_string(),
                };
                RouteAction::Forward(ForwardPlan {
                    method: method.clone(),
                    target,
                })
            }
        };

        Some(RouteMatch {
            name: &route.name,
            action,
        })
    }

    /// Routes in evaluation order.
    pub fn summary(&self) -> Vec<RouteSummary> {
        self.routes.iter().map(|r| r.summary.clone()).collect()
    }
}

fn local(name: &str, path: &str, kind: RouteKind) -> Route {
    Route {
        name: name.to_string(),
        priority: LOCAL_PRIORITY,
        specificity: path.len(),
        matcher: Box::new(AndMatcher::new(vec![
            Box::new(MethodMatcher::new(Method::GET)),
            Box::new(ExactPathMatcher::new(path)),
        ])),
        kind,
        summary: RouteSummary {
            name: name.to_string(),
            method: Method::GET.to_string(),
            path: path.to_string(),
        },
    }
}

fn parse_method(route: &str, method: &str) -> Result<Method, RouteError> {
    Method::from_bytes(method.as_bytes()).map_err(|_| RouteError::InvalidMethod {
        route: route.to_string(),
        method: method.to_string(),
    })
}
