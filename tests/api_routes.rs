//! End-to-end tests for the /api routes, driven through the full router
//! against the in-memory store.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use rollcall::http::server::app;
use rollcall::http::AppState;
use rollcall::store::MemoryStore;

fn test_app() -> Router {
    let state = Arc::new(AppState::new(Arc::new(MemoryStore::new()), "test"));
    app(state, &PathBuf::from("public"))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn student_body(name: &str, email: &str, course: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "course": course,
        "enrollmentDate": "2024-09-01T00:00:00Z",
    })
}

fn course_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "A course",
        "duration": 12,
    })
}

// ==================
// Students
// ==================

#[tokio::test]
async fn test_create_student_returns_created_record() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada", "ada@example.com", "Math")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["status"], "active");
    assert!(body["id"].as_str().unwrap().len() == 24);
    assert!(body["createdAt"].as_str().is_some());
}

#[tokio::test]
async fn test_duplicate_email_rejected_and_not_persisted() {
    let app = test_app();
    send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada", "ada@example.com", "Math")),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Impostor", "ada@example.com", "Physics")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));
    assert_eq!(body["code"], 400);

    let (_, list) = send(&app, "GET", "/api/students", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_student_missing_fields() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(json!({ "email": "ada@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("name is required"));
    assert!(message.contains("course is required"));
    assert!(message.contains("enrollmentDate is required"));
}

#[tokio::test]
async fn test_create_student_unknown_field_rejected() {
    let app = test_app();
    let mut body = student_body("Ada", "ada@example.com", "Math");
    body["nickname"] = json!("countess");

    let (status, _) = send(&app, "POST", "/api/students", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_students_listed_newest_first() {
    let app = test_app();
    send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("First", "first@example.com", "Math")),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Second", "second@example.com", "Math")),
    )
    .await;

    let (status, list) = send(&app, "GET", "/api/students", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_get_student_malformed_id_is_400() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/students/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid identifier"));
}

#[tokio::test]
async fn test_get_student_absent_id_is_404() {
    let app = test_app();
    let absent = bson::oid::ObjectId::new().to_hex();
    let (status, _) = send(&app, "GET", &format!("/api/students/{}", absent), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_student_partial() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada", "ada@example.com", "Math")),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/students/{}", id),
        Some(json!({ "course": "Physics", "status": "inactive" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["course"], "Physics");
    assert_eq!(updated["status"], "inactive");
    // Untouched fields survive the merge
    assert_eq!(updated["name"], "Ada");
    assert_eq!(updated["email"], "ada@example.com");
}

#[tokio::test]
async fn test_update_student_empty_body_ok() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada", "ada@example.com", "Math")),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(&app, "PUT", &format!("/api/students/{}", id), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ada");
}

#[tokio::test]
async fn test_update_absent_student_is_404() {
    let app = test_app();
    let absent = bson::oid::ObjectId::new().to_hex();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/students/{}", absent),
        Some(json!({ "name": "Nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_student() {
    let app = test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada", "ada@example.com", "Math")),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/api/students/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().is_some());

    let (status, _) = send(&app, "DELETE", &format!("/api/students/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_matches_name_course_and_email() {
    let app = test_app();
    send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada Lovelace", "ada@example.com", "Mathematics")),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Grace Hopper", "grace@navy.mil", "Compilers")),
    )
    .await;

    // Case-insensitive name match
    let (status, hits) = send(&app, "GET", "/api/students/search?q=LOVELACE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);

    // Course match
    let (_, hits) = send(&app, "GET", "/api/students/search?q=compil", None).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["name"], "Grace Hopper");

    // Email match
    let (_, hits) = send(&app, "GET", "/api/students/search?q=navy.mil", None).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);

    // A student matching on several fields appears once
    let (_, hits) = send(&app, "GET", "/api/students/search?q=ada", None).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let (_, hits) = send(&app, "GET", "/api/students/search?q=zzz", None).await;
    assert_eq!(hits.as_array().unwrap().len(), 0);
}

// ==================
// Courses
// ==================

#[tokio::test]
async fn test_create_and_list_courses_sorted_by_name() {
    let app = test_app();
    let (status, created) = send(&app, "POST", "/api/courses", Some(course_body("Zoology"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["duration"], 12);

    send(&app, "POST", "/api/courses", Some(course_body("Algebra"))).await;

    let (_, list) = send(&app, "GET", "/api/courses", None).await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Algebra", "Zoology"]);
}

#[tokio::test]
async fn test_duplicate_course_name_rejected() {
    let app = test_app();
    send(&app, "POST", "/api/courses", Some(course_body("Algebra"))).await;

    let (status, body) = send(&app, "POST", "/api/courses", Some(course_body("Algebra"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_create_course_missing_fields() {
    let app = test_app();
    let (status, body) = send(&app, "POST", "/api/courses", Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("description is required"));
    assert!(message.contains("duration is required"));
}

#[tokio::test]
async fn test_course_delete_blocked_by_enrolled_students() {
    let app = test_app();
    let (_, course) = send(&app, "POST", "/api/courses", Some(course_body("Algebra"))).await;
    let course_id = course["id"].as_str().unwrap().to_string();

    // Student referencing the course by id string
    let (_, student) = send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada", "ada@example.com", &course_id)),
    )
    .await;

    let (status, body) = send(&app, "DELETE", &format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("1 enrolled"));

    // The course survives a blocked delete
    let (status, _) = send(&app, "GET", &format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::OK);

    // Remove the student; the delete now goes through
    let student_id = student["id"].as_str().unwrap();
    send(&app, "DELETE", &format!("/api/students/{}", student_id), None).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_course_delete_ignores_name_references() {
    let app = test_app();
    let (_, course) = send(&app, "POST", "/api/courses", Some(course_body("Algebra"))).await;
    let course_id = course["id"].as_str().unwrap();

    // A name reference does not block deletion; only the id string counts
    send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada", "ada@example.com", "Algebra")),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/api/courses/{}", course_id), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_course_duplicate_name_rejected() {
    let app = test_app();
    send(&app, "POST", "/api/courses", Some(course_body("Algebra"))).await;
    let (_, other) = send(&app, "POST", "/api/courses", Some(course_body("Zoology"))).await;
    let id = other["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/courses/{}", id),
        Some(json!({ "name": "Algebra" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ==================
// Dashboard
// ==================

#[tokio::test]
async fn test_dashboard_stats_empty() {
    let app = test_app();
    let (status, stats) = send(&app, "GET", "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalStudents"], 0);
    assert_eq!(stats["successRate"], 0);
    assert_eq!(stats["studentsByCourse"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_dashboard_stats_counts_and_rate() {
    let app = test_app();
    send(&app, "POST", "/api/courses", Some(course_body("Algebra"))).await;

    send(
        &app,
        "POST",
        "/api/students",
        Some(student_body("Ada", "ada@example.com", "Algebra")),
    )
    .await;
    let mut graduated = student_body("Grace", "grace@example.com", "Compilers");
    graduated["status"] = json!("inactive");
    send(&app, "POST", "/api/students", Some(graduated)).await;

    let (_, stats) = send(&app, "GET", "/api/dashboard/stats", None).await;
    assert_eq!(stats["totalStudents"], 2);
    assert_eq!(stats["activeStudents"], 1);
    assert_eq!(stats["graduates"], 1);
    assert_eq!(stats["totalCourses"], 1);
    assert_eq!(stats["activeCourses"], 1);
    assert_eq!(stats["successRate"], 50);

    let by_course = stats["studentsByCourse"].as_array().unwrap();
    assert_eq!(by_course.len(), 2);
    assert!(by_course
        .iter()
        .any(|b| b["course"] == "Algebra" && b["count"] == 1));
}
