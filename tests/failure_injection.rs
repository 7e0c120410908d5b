//! Failure injection tests for the proxy.

use axum::{
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use mcp_http_proxy::config::presets;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_backend_down_yields_500_envelope() {
    let backend = common::unreachable_addr().await;
    let (proxy, shutdown) = common::start_proxy(presets::github(), backend).await;

    let res = common::client()
        .post(format!("http://{}/tools/call", proxy))
        .json(&json!({"tool": "ping"}))
        .send()
        .await
        .expect("Proxy must answer even when the backend is down");

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to proxy request"));
    assert!(body["details"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_ignores_backend_state() {
    let backend = common::unreachable_addr().await;
    let (proxy, shutdown) = common::start_proxy(presets::github(), backend).await;

    let res = common::client()
        .get(format!("http://{}/health", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["target"], format!("http://{}", backend));

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_404_text_passed_through() {
    let backend = common::start_raw_backend("404 Not Found", "text/plain", "repository not found").await;
    let (proxy, shutdown) = common::start_proxy(presets::github(), backend).await;

    let res = common::client()
        .get(format!("http://{}/mcp/github/repos/missing", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "repository not found");

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_error_json_passed_through() {
    let backend = common::start_backend(Router::new().route(
        "/mcp/github/analysis",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"success": false, "error": "analysis not ready"})),
            )
        }),
    ))
    .await;
    let (proxy, shutdown) = common::start_proxy(presets::github(), backend).await;

    let res = common::client()
        .get(format!("http://{}/mcp/github/analysis", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"success": false, "error": "analysis not ready"})
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_upstream_json() {
    let backend = common::start_raw_backend("200 OK", "application/json", "{not json").await;
    let (proxy, shutdown) = common::start_proxy(presets::github(), backend).await;

    let res = common::client()
        .get(format!("http://{}/mcp/github/repos", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Malformed upstream response");

    shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_request_json_rejected_locally() {
    let backend = common::start_echo_backend().await;
    let (proxy, shutdown) = common::start_proxy(presets::github(), backend).await;

    let res = common::client()
        .post(format!("http://{}/tools/call", proxy))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{\"tool\":")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unrouted_path_is_404_envelope() {
    let backend = common::start_echo_backend().await;
    let (proxy, shutdown) = common::start_proxy(presets::docker(), backend).await;

    let res = common::client()
        .get(format!("http://{}/mcp/docker/containers", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route not found");

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_requests_independent() {
    let backend = common::start_echo_backend().await;
    let (proxy, shutdown) = common::start_proxy(presets::github(), backend).await;
    let client = common::client();

    let mut tasks = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let url = format!("http://{}/mcp/github/item/{}", proxy, i);
        tasks.push(tokio::spawn(async move {
            let seen: Value = client.get(url).send().await.unwrap().json().await.unwrap();
            (i, seen)
        }));
    }

    for task in tasks {
        let (i, seen) = task.await.unwrap();
        assert_eq!(seen["path"], format!("/mcp/github/item/{}", i));
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_404_json_byte_exact() {
    let backend = common::start_raw_backend(
        "404 Not Found",
        "application/json",
        r#"{"success":false,"error":"not found"}"#,
    )
    .await;
    let (proxy, shutdown) = common::start_proxy(presets::github(), backend).await;

    let res = common::client()
        .get(format!("http://{}/mcp/github/repos/missing", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(
        res.text().await.unwrap(),
        r#"{"success":false,"error":"not found"}"#
    );

    shutdown.trigger();
}
