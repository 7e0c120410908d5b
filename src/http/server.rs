//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing, CORS, body limit, panic catch)
//! - Bind server to listener and serve until shutdown
//! - Dispatch requests through the route table
//! - Forward to the backend and relay the response
//!
//! # Request States
//! ```text
//! Received → Routed → Forwarding → {Relaying | Failed} → Completed
//! ```
//! Every request reaches `Completed` with exactly one response.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::backend::{BackendUrl, Forwarder};
use crate::config::ProxyConfig;
use crate::http::error::{handle_panic, ProxyError};
use crate::http::local;
use crate::http::request::InboundRequest;
use crate::http::response::relay;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics::{self, Outcome};
use crate::routing::{ForwardPlan, RouteAction, RouteError, RouteTable};
use crate::security;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProxyConfig>,
    pub routes: Arc<RouteTable>,
    pub forwarder: Forwarder,
}

/// HTTP server for one proxy instance.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
    backend: BackendUrl,
}

impl HttpServer {
    /// Create a new HTTP server for `config`, forwarding to `backend`.
    pub fn new(config: ProxyConfig, backend: BackendUrl) -> Result<Self, RouteError> {
        let routes = Arc::new(RouteTable::from_config(&config.routes)?);
        let config = Arc::new(config);

        let state = AppState {
            service: config.clone(),
            routes,
            forwarder: Forwarder::new(backend.clone()),
        };

        let router = Self::build_router(state, config.limits.max_body_bytes);
        Ok(Self {
            router,
            config,
            backend,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, max_body_bytes: usize) -> Router {
        let routes = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state);
        with_middleware(routes, max_body_bytes)
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            proxy = %self.config.name,
            address = %addr,
            backend = %self.backend,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!(proxy = %self.config.name, "HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn backend(&self) -> &BackendUrl {
        &self.backend
    }
}

/// Wrap `routes` in the request boundary: panic catch, body limit, CORS,
/// request id and trace span.
fn with_middleware(routes: Router, max_body_bytes: usize) -> Router {
    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(security::cors_layer())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn make_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Main dispatch handler: route, then answer locally or forward and relay.
async fn dispatch(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let start_time = Instant::now();
    let method = request.method().clone();
    let proxy = state.service.name.as_str();

    let Some(matched) = state.routes.resolve(&method, request.uri()) else {
        let path = request.uri().path().to_string();
        tracing::warn!(proxy = %proxy, method = %method, path = %path, "No route matched");
        metrics::record_request(
            proxy,
            "none",
            &method,
            StatusCode::NOT_FOUND,
            Outcome::Failed,
            start_time,
        );
        return Err(ProxyError::NoRoute { method, path });
    };
    let route = matched.name;
    let answered_locally = !matches!(matched.action, RouteAction::Forward(_));

    let result = match matched.action {
        RouteAction::Health => Ok(local::health(&state).into_response()),
        RouteAction::Describe => Ok(local::describe(&state).into_response()),
        RouteAction::Forward(plan) => forward_and_relay(&state, request, route, plan).await,
    };

    let (status, outcome) = match &result {
        Ok(response) if answered_locally => (response.status(), Outcome::Local),
        Ok(response) => (response.status(), Outcome::Relayed),
        Err(e) => (e.status(), Outcome::Failed),
    };
    metrics::record_request(proxy, route, &method, status, outcome, start_time);

    result
}

async fn forward_and_relay(
    state: &AppState,
    request: Request<Body>,
    route: &str,
    plan: ForwardPlan,
) -> Result<Response, ProxyError> {
    let proxy = state.service.name.as_str();
    let inbound = InboundRequest::read(request, state.service.limits.max_body_bytes).await?;

    let upstream = state
        .forwarder
        .forward(&inbound, &plan.target, &plan.method)
        .await
        .inspect_err(|e| {
            tracing::error!(
                proxy = %proxy,
                route = %route,
                method = %plan.method,
                target = %plan.target,
                error = %e,
                "Proxy error"
            );
        })?;

    tracing::info!(
        proxy = %proxy,
        route = %route,
        method = %plan.method,
        target = %plan.target,
        status = upstream.status.as_u16(),
        "Relaying upstream response"
    );

    relay(upstream).inspect_err(|e| {
        tracing::error!(proxy = %proxy, route = %route, error = %e, "Failed to relay upstream body");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use axum::http::{header, Method};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        // Nothing listens on port 9; local routes must not care.
        HttpServer::new(presets::github(), BackendUrl::new("http://127.0.0.1:9")).unwrap()
    }

    async fn call(method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        server().router().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_answered_locally() {
        let response = call(Method::GET, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["success"], true);
        assert_eq!(body["service"], "github-mcp-http-proxy");
        assert_eq!(body["target"], "http://127.0.0.1:9");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_describe_lists_routes() {
        let response = call(Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["name"], "GitHub MCP HTTP Proxy");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["endpoints"]["health"], "GET /health");
        assert_eq!(body["endpoints"]["tools_call"], "POST /tools/call");
        assert_eq!(body["endpoints"]["github"], "ANY /mcp/github/*");
        assert_eq!(body["usage"]["analysis"], "GET /mcp/github/analysis");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_envelope() {
        let response = call(Method::GET, "/nowhere").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Route not found");
    }

    #[tokio::test]
    async fn test_request_id_preserved() {
        let request = Request::builder()
            .uri("/health")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = server().router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/tools/call")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = server().router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = presets::github();
        config.limits.max_body_bytes = 16;
        let server = HttpServer::new(config, BackendUrl::new("http://127.0.0.1:9")).unwrap();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/tools/call")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, "36")
            .body(Body::from(r#"{"tool":"ping","padding":"xxxxxxxx"}"#))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit_is_413() {
        let mut config = presets::github();
        config.limits.max_body_bytes = 16;
        let server = HttpServer::new(config, BackendUrl::new("http://127.0.0.1:9")).unwrap();

        // No content-length: the limit trips while the body is read.
        let request = Request::builder()
            .method(Method::POST)
            .uri("/tools/call")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"tool":"ping","padding":"xxxxxxxx"}"#))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Request body too large");
    }

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500_envelope() {
        let routes = Router::new().route("/explode", axum::routing::get(explode));
        let request = Request::builder()
            .uri("/explode")
            .header(X_REQUEST_ID, "panic-1")
            .body(Body::empty())
            .unwrap();

        let response = with_middleware(routes, 1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[X_REQUEST_ID], "panic-1");

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal proxy error");
        assert!(body.get("details").is_none());
    }
}
