//! HTTP surface of the hub.
//!
//! `GET /` lists skills, `GET /health` is a static liveness probe, and
//! `POST /skill-call` forwards one skill request.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use skillhub_core::{ErrorDetail, HealthStatus, HubInfo};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::dispatch::{DispatchError, Dispatcher};

/// Shared state for HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(hub_info))
        .route("/health", get(health_check))
        // No local size cap: file contents travel inline.
        .route(
            "/skill-call",
            post(skill_call).layer(DefaultBodyLimit::disable()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn start_server(
    state: Arc<AppState>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

impl From<DispatchError> for (StatusCode, Json<ErrorDetail>) {
    fn from(err: DispatchError) -> Self {
        (
            err.status_code(),
            Json(ErrorDetail {
                detail: err.detail(),
            }),
        )
    }
}

// --- Handlers ---

/// GET / - Hub status and the registered skill names.
async fn hub_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HubInfo::operational(state.dispatcher.registry().names()))
}

/// GET /health - Always healthy; no provider is contacted.
async fn health_check() -> impl IntoResponse {
    Json(HealthStatus::healthy())
}

/// POST /skill-call - Dispatch `{skill, params}`.
///
/// The body is taken as raw bytes so a missing content type or malformed
/// JSON is reported by the dispatcher rather than by an extractor.
async fn skill_call(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<ErrorDetail>)> {
    let result = state.dispatcher.dispatch(&body).await?;
    Ok(Json(result))
}
