//! HTTP proxy server
//!
//! Forwards `{webhook, method, params}` envelopes to the remote API from the
//! server side, for clients that cannot reach the remote directly.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::params::encode_form;
use crate::types::method_url;

/// Remote methods the proxy forwards
pub const ALLOWED_METHODS: &[&str] = &[
    "tasks.task.list",
    "profile",
    "user.get",
    "lists.element.get",
    "lists.element.add",
    "lists.element.update",
    "lists.get",
    "lists.field.get",
];

/// Upstream body prefix echoed back when it is not JSON
const DETAILS_LIMIT: usize = 2000;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Timeout for forwarded calls
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    client: reqwest::Client,
}

/// Build the proxy router
pub fn router(config: &ServerConfig) -> Result<Router> {
    let client = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build upstream client: {e}")))?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/server/bitrix", post(forward))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState { client })))
}

/// Start the proxy server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let app = router(&config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting proxy server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

fn error_with_details(status: StatusCode, error: &str, details: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "error": error, "details": details.into() })),
    )
        .into_response()
}

/// Forward one call to the remote API
async fn forward(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    // Unparseable bodies are treated as empty so they fail validation below
    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|_| json!({}));

    let webhook = payload
        .get("webhook")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    let method = payload
        .get("method")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    let params = payload
        .get("params")
        .filter(|p| p.is_object())
        .cloned()
        .unwrap_or_else(|| json!({}));

    if webhook.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Webhook URL is required");
    }
    if method.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Remote method is required");
    }
    if !ALLOWED_METHODS.contains(&method) {
        return error_response(StatusCode::FORBIDDEN, "Method is not allowed");
    }

    let target = match url::Url::parse(&method_url(webhook, method)) {
        Ok(url) => url,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid webhook URL"),
    };

    debug!("Forwarding {} to {}", method, target.host_str().unwrap_or_default());

    let upstream = match state
        .client
        .post(target)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(encode_form(&params))
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            warn!("Upstream unreachable for {}: {}", method, e);
            return error_with_details(
                StatusCode::BAD_GATEWAY,
                "Failed to reach the remote API",
                e.to_string(),
            );
        }
    };

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let text = match upstream.text().await {
        Ok(text) => text,
        Err(e) => {
            return error_with_details(
                StatusCode::BAD_GATEWAY,
                "Failed to read the remote response",
                e.to_string(),
            )
        }
    };

    if text.trim().is_empty() {
        return (status, Json(json!({}))).into_response();
    }

    let data: Value = match serde_json::from_str(&text) {
        Ok(data) => data,
        Err(_) => {
            let details: String = text.chars().take(DETAILS_LIMIT).collect();
            return error_with_details(
                StatusCode::BAD_GATEWAY,
                "Remote API returned invalid JSON",
                details,
            );
        }
    };

    if status.is_success() {
        (StatusCode::OK, Json(data)).into_response()
    } else {
        (status, Json(data)).into_response()
    }
}
