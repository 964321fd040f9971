//! Dashboard HTTP Routes

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::stats::DashboardStats;
use crate::store::RecordStore;

use super::{ApiResult, AppState};

/// Create dashboard routes
pub fn dashboard_routes<S: RecordStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/dashboard/stats", get(get_stats::<S>))
        .with_state(state)
}

/// Aggregate counters plus the derived success rate
async fn get_stats<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Json<DashboardStats>> {
    let counts = state.store.dashboard_counts().await?;
    Ok(Json(DashboardStats::from_counts(counts)))
}
