//! Student HTTP Routes
//!
//! CRUD plus free-text search for the `students` collection.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{CreateStudent, StudentResponse, UpdateStudent};
use crate::observability::logger;
use crate::store::RecordStore;

use super::response::MessageResponse;
use super::{parse_id, ApiError, ApiResult, AppState};

/// Create student routes
pub fn student_routes<S: RecordStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/students", get(list_students::<S>))
        .route("/students", post(create_student::<S>))
        // Registered alongside /students/:id; the static segment wins
        .route("/students/search", get(search_students::<S>))
        .route("/students/:id", get(get_student::<S>))
        .route("/students/:id", put(update_student::<S>))
        .route("/students/:id", delete(delete_student::<S>))
        .with_state(state)
}

/// List all students, newest first
async fn list_students<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Json<Vec<StudentResponse>>> {
    let students = state.store.list_students().await?;
    Ok(Json(
        students.into_iter().map(StudentResponse::from).collect(),
    ))
}

async fn get_student<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<StudentResponse>> {
    // Malformed identifiers are a 400, distinct from a well-formed
    // identifier that matches nothing (404).
    let oid = parse_id(&id)?;
    match state.store.find_student(oid).await? {
        Some(student) => Ok(Json(student.into())),
        None => {
            logger::warn("STUDENT_NOT_FOUND", &[("id", &id)]);
            Err(ApiError::NotFound("student"))
        }
    }
}

async fn create_student<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<StudentResponse>)> {
    let body: CreateStudent =
        serde_json::from_value(body).map_err(|e| ApiError::Validation(e.to_string()))?;
    let new = body.validate()?;

    let created = state.store.insert_student(new).await?;
    logger::info(
        "STUDENT_CREATED",
        &[("id", &created.id.to_hex()), ("email", &created.email)],
    );
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_student<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<StudentResponse>> {
    let oid = parse_id(&id)?;
    let body: UpdateStudent =
        serde_json::from_value(body).map_err(|e| ApiError::Validation(e.to_string()))?;
    let patch = body.validate()?;

    match state.store.update_student(oid, patch).await? {
        Some(updated) => {
            logger::info("STUDENT_UPDATED", &[("id", &id), ("email", &updated.email)]);
            Ok(Json(updated.into()))
        }
        None => {
            logger::warn("STUDENT_NOT_FOUND", &[("id", &id)]);
            Err(ApiError::NotFound("student"))
        }
    }
}

async fn delete_student<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let oid = parse_id(&id)?;
    if !state.store.delete_student(oid).await? {
        logger::warn("STUDENT_NOT_FOUND", &[("id", &id)]);
        return Err(ApiError::NotFound("student"));
    }

    logger::info("STUDENT_DELETED", &[("id", &id)]);
    Ok(Json(MessageResponse::new("student deleted")))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Case-insensitive substring search across name, course, and email
async fn search_students<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<StudentResponse>>> {
    let matches = state.store.search_students(&query.q).await?;
    logger::info(
        "STUDENT_SEARCH",
        &[("q", &query.q), ("matches", &matches.len().to_string())],
    );
    Ok(Json(matches.into_iter().map(StudentResponse::from).collect()))
}
