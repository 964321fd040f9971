//! # HTTP API
//!
//! Axum routers for the record collections, the dashboard, and the
//! operational endpoints, combined by `server::HttpServer`.

pub mod course_routes;
pub mod dashboard_routes;
pub mod errors;
pub mod health_routes;
pub mod response;
pub mod server;
pub mod student_routes;

use std::sync::Arc;
use std::time::Instant;

use bson::oid::ObjectId;

use crate::store::RecordStore;

pub use errors::{ApiError, ApiResult};
pub use server::HttpServer;

/// State shared by every handler
pub struct AppState<S> {
    pub store: Arc<S>,
    pub environment: String,
    pub started_at: Instant,
}

impl<S: RecordStore> AppState<S> {
    pub fn new(store: Arc<S>, environment: impl Into<String>) -> Self {
        Self {
            store,
            environment: environment.into(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Parse a path identifier, rejecting malformed values with 400 before any
/// store call.
pub(crate) fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::InvalidId(id.to_string()))
}
