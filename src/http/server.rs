//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the single gateway handler
//! - Wire up middleware (CORS, tracing, request ID, limits, timeout)
//! - Bind server to listener, graceful shutdown
//! - Resolve the route table and dispatch to named handlers
//! - Generic passthrough for unmatched paths

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderName, Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::middleware::cors_middleware;
use crate::http::request::RequestIdLayer;
use crate::http::response;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state injected into the gateway handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub upstream: Arc<UpstreamClient>,
    pub max_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given (validated) configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, UpstreamError> {
        let state = AppState {
            routes: Arc::new(RouteTable::new()),
            upstream: Arc::new(UpstreamClient::new(&config.upstream)?),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
            // Outermost: decorates every response and intercepts OPTIONS
            // before anything else runs.
            .layer(middleware::from_fn(cors_middleware))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler: resolve the route table, dispatch to a named
/// handler or fall through to the generic passthrough.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method_str = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method_str,
        path = %path,
        "Dispatching request"
    );

    let endpoint = state.routes.resolve(&path);
    let endpoint_label = endpoint.map(|e| e.label()).unwrap_or("passthrough");

    let response = match endpoint {
        Some(endpoint) => {
            let raw_query = request.uri().query().map(str::to_string);
            handlers::dispatch_named(&state.upstream, endpoint, raw_query.as_deref()).await
        }
        None => generic_passthrough(&state, request).await,
    };

    metrics::record_request(
        &method_str,
        response.status().as_u16(),
        endpoint_label,
        start_time,
    );
    response
}

/// Headers never copied back from the upstream response: hop-by-hop
/// headers, plus framing headers invalidated by body re-assembly.
fn is_forwardable(name: &HeaderName) -> bool {
    const SKIP: [&str; 10] = [
        "connection",
        "keep-alive",
        "proxy-authenticate",
        "proxy-authorization",
        "te",
        "trailer",
        "transfer-encoding",
        "upgrade",
        "content-length",
        "content-encoding",
    ];
    !SKIP.contains(&name.as_str())
}

/// Forward an unmatched request to the upstream as-is, with injected
/// credentials, and stream status, body and headers back.
async fn generic_passthrough(state: &AppState, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    let raw_query = parts.uri.query().map(str::to_string);
    let content_type = parts.headers.get(CONTENT_TYPE).cloned();

    // GET/HEAD bodies are dropped; everything else is buffered for the
    // upstream call, capped at the configured limit.
    let body_bytes = if method == Method::GET || method == Method::HEAD {
        None
    } else {
        match axum::body::to_bytes(body, state.max_body_bytes).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to buffer request body");
                return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
            }
        }
    };

    match state
        .upstream
        .forward(method, &path, raw_query.as_deref(), body_bytes, content_type)
        .await
    {
        Ok(upstream_response) => {
            let mut response = Response::new(Body::from(upstream_response.body));
            *response.status_mut() = upstream_response.status;
            for (name, value) in upstream_response.headers.iter() {
                if is_forwardable(name) {
                    response.headers_mut().append(name.clone(), value.clone());
                }
            }
            response.into_response()
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Passthrough request failed");
            response::connection_error(e.to_string())
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
