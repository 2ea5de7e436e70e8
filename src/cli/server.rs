//! HTTP server mode for REST access to the tools

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result, ResultExt};
use crate::tools::{dispatch, ToolContext, TOOLS};
use crate::types::JsonValue;

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    ctx: ToolContext,
    /// Raised on shutdown; running batches stop admitting work
    shutdown: CancellationToken,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the router
pub fn router(ctx: ToolContext, shutdown: CancellationToken) -> Router {
    let state = AppState { ctx, shutdown };

    // Build CORS layer - allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/:name", post(run_tool))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(ctx: ToolContext, port: u16) -> Result<()> {
    let shutdown = CancellationToken::new();
    let app = router(ctx, shutdown.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to port {port}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// List tool names and descriptions
async fn list_tools() -> impl IntoResponse {
    Json(ApiResponse::success(TOOLS))
}

/// Run a tool; the request body holds its arguments
async fn run_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    if !TOOLS.iter().any(|tool| tool.name == name) {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("Unknown tool: {name}"))),
        )
            .into_response();
    }

    let args = if body.iter().all(u8::is_ascii_whitespace) {
        JsonValue::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(args) => args,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error(format!("Invalid JSON body: {e}"))),
                )
                    .into_response()
            }
        }
    };

    match dispatch(&state.ctx, &name, args, Some(&state.shutdown)).await {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(e) => (error_status(&e), Json(ApiResponse::<()>::error(e.to_string()))).into_response(),
    }
}

fn error_status(error: &Error) -> StatusCode {
    if error.is_configuration() {
        StatusCode::BAD_REQUEST
    } else if error.is_cancelled() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    }
}
