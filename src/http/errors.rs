//! # API Errors
//!
//! Error taxonomy for the HTTP layer. Client errors (4xx, 503) echo their
//! message in the body; internal faults return a generic message and record
//! the underlying detail to the operational log instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::models::ValidationError;
use crate::observability::logger;
use crate::store::StoreError;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request body failed validation
    #[error("{0}")]
    Validation(String),

    /// Path identifier is not a valid ObjectId
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A uniqueness invariant rejected the write
    #[error("{0}")]
    Duplicate(String),

    /// A course with enrolled students cannot be deleted
    #[error("course has {students} enrolled student(s) and cannot be deleted")]
    CourseHasStudents { students: u64 },

    /// Resource not found
    #[error("{0} not found")]
    NotFound(&'static str),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The document store could not be reached
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Unexpected fault; detail is logged, not returned
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::Duplicate(_) => StatusCode::BAD_REQUEST,
            ApiError::CourseHasStudents { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(detail) => ApiError::Unavailable(detail),
            dup @ StoreError::Duplicate { .. } => ApiError::Duplicate(dup.to_string()),
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.0)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal(detail) => {
                logger::error("UNHANDLED_FAULT", &[("detail", detail)]);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });
        (status, body).into_response()
    }
}
