//! Course HTTP Routes
//!
//! CRUD endpoints for the `courses` collection. Deletion is refused while
//! any student's `course` field equals the course's id hex string; the
//! count-then-delete pair is two store calls, not one atomic operation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::Value;

use crate::models::{CourseResponse, CreateCourse, UpdateCourse};
use crate::observability::logger;
use crate::store::RecordStore;

use super::response::MessageResponse;
use super::{parse_id, ApiError, ApiResult, AppState};

/// Create course routes
pub fn course_routes<S: RecordStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/courses", get(list_courses::<S>))
        .route("/courses", post(create_course::<S>))
        .route("/courses/:id", get(get_course::<S>))
        .route("/courses/:id", put(update_course::<S>))
        .route("/courses/:id", delete(delete_course::<S>))
        .with_state(state)
}

/// List all courses, sorted by name ascending
async fn list_courses<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Json<Vec<CourseResponse>>> {
    let courses = state.store.list_courses().await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

async fn get_course<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CourseResponse>> {
    let oid = parse_id(&id)?;
    match state.store.find_course(oid).await? {
        Some(course) => Ok(Json(course.into())),
        None => {
            logger::warn("COURSE_NOT_FOUND", &[("id", &id)]);
            Err(ApiError::NotFound("course"))
        }
    }
}

async fn create_course<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CourseResponse>)> {
    let body: CreateCourse =
        serde_json::from_value(body).map_err(|e| ApiError::Validation(e.to_string()))?;
    let new = body.validate()?;

    let created = state.store.insert_course(new).await?;
    logger::info(
        "COURSE_CREATED",
        &[("id", &created.id.to_hex()), ("name", &created.name)],
    );
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_course<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<CourseResponse>> {
    let oid = parse_id(&id)?;
    let body: UpdateCourse =
        serde_json::from_value(body).map_err(|e| ApiError::Validation(e.to_string()))?;
    let patch = body.validate()?;

    match state.store.update_course(oid, patch).await? {
        Some(updated) => {
            logger::info("COURSE_UPDATED", &[("id", &id), ("name", &updated.name)]);
            Ok(Json(updated.into()))
        }
        None => {
            logger::warn("COURSE_NOT_FOUND", &[("id", &id)]);
            Err(ApiError::NotFound("course"))
        }
    }
}

async fn delete_course<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let oid = parse_id(&id)?;

    let dependents = state.store.count_students_in_course(&oid.to_hex()).await?;
    if dependents > 0 {
        logger::warn(
            "COURSE_DELETE_BLOCKED",
            &[("id", &id), ("students", &dependents.to_string())],
        );
        return Err(ApiError::CourseHasStudents {
            students: dependents,
        });
    }

    if !state.store.delete_course(oid).await? {
        logger::warn("COURSE_NOT_FOUND", &[("id", &id)]);
        return Err(ApiError::NotFound("course"));
    }

    logger::info("COURSE_DELETED", &[("id", &id)]);
    Ok(Json(MessageResponse::new("course deleted")))
}
