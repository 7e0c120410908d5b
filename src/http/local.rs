//! Endpoints answered by the proxy itself.
//!
//! Neither handler touches the backend, so both succeed even when it is down.

use std::collections::BTreeMap;

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub success: bool,
    pub status: &'static str,
    pub service: String,
    pub message: String,
    pub target: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceDescription {
    pub name: String,
    pub version: String,
    pub description: String,
    pub backend: String,
    /// Route name → "METHOD path", for every route the proxy serves.
    pub endpoints: BTreeMap<String, String>,
    /// Documented backend operation → "METHOD path".
    pub usage: BTreeMap<String, String>,
}

/// `GET /health`
pub fn health(state: &AppState) -> Json<HealthStatus> {
    Json(HealthStatus {
        success: true,
        status: "ok",
        service: state.service.name.clone(),
        message: format!("{} is running", state.service.display_name),
        target: state.forwarder.backend().to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `GET /`
pub fn describe(state: &AppState) -> Json<ServiceDescription> {
    let endpoints = state
        .routes
        .summary()
        .into_iter()
        .map(|route| (route.name, format!("{} {}", route.method, route.path)))
        .collect();

    let usage = state
        .service
        .usage
        .iter()
        .map(|op| (op.name.clone(), format!("{} {}", op.method, op.path)))
        .collect();

    Json(ServiceDescription {
        name: state.service.display_name.clone(),
        version: state.service.version.clone(),
        description: state.service.description.clone(),
        backend: state.forwarder.backend().to_string(),
        endpoints,
        usage,
    })
}
