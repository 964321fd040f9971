//! Operational HTTP Routes
//!
//! Liveness and detailed health reporting. The liveness endpoint never
//! touches the store; the detailed endpoint reads the store's readiness
//! flag rather than issuing a live ping.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::observability::{logger, system};
use crate::store::RecordStore;

use super::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub environment: String,
}

/// Detailed health response
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: &'static str,
    pub database: DatabaseHealth,
    pub memory: MemoryHealth,
    pub uptime: String,
    pub environment: String,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryHealth {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

#[derive(Debug, Serialize)]
struct DownResponse {
    status: &'static str,
}

/// Create health routes
pub fn health_routes<S: RecordStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(liveness::<S>))
        .route("/health/detailed", get(detailed_health::<S>))
        .with_state(state)
}

/// Liveness check; always 200, never queries the store
async fn liveness<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "up",
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: state.uptime_seconds(),
        environment: state.environment.clone(),
    })
}

/// Detailed health; degrades to a 500 down-status instead of faulting
async fn detailed_health<S: RecordStore>(State(state): State<Arc<AppState<S>>>) -> Response {
    let memory = match system::memory_usage() {
        Ok(usage) => usage,
        Err(e) => {
            logger::error("HEALTH_PROBE_FAILED", &[("detail", &e.to_string())]);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DownResponse { status: "down" }),
            )
                .into_response();
        }
    };

    let payload = DetailedHealthResponse {
        status: "up",
        database: DatabaseHealth {
            status: if state.store.is_connected() {
                "Connected"
            } else {
                "Disconnected"
            },
        },
        memory: MemoryHealth {
            resident_bytes: memory.resident_bytes,
            virtual_bytes: memory.virtual_bytes,
        },
        uptime: system::format_uptime(state.uptime_seconds()),
        environment: state.environment.clone(),
    };

    (StatusCode::OK, Json(payload)).into_response()
}
