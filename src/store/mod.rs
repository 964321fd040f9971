//! # Record Store
//!
//! Storage seam for the request handlers. `MongoStore` is the production
//! backend; `MemoryStore` backs tests and local development. All coordination
//! between handlers happens through this shared store, never through
//! handler-to-handler state.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use bson::oid::ObjectId;
use thiserror::Error;

use crate::models::{Course, CoursePatch, NewCourse, NewStudent, Student, StudentPatch};
use crate::stats::DashboardCounts;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached; handlers answer 503
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// A unique index rejected the write
    #[error("a record with this {field} already exists")]
    Duplicate { field: &'static str },

    /// Any other driver failure
    #[error("store operation failed: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Operations the handlers need from a record store.
///
/// Reads return `Option`/`bool` for absent records; only infrastructure
/// failures surface as `StoreError`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ensure a usable connection exists. Called by the readiness middleware
    /// before any `/api` handler body runs, and once at startup.
    async fn ready(&self) -> StoreResult<()>;

    /// Readiness flag for the detailed health report; not a live ping.
    fn is_connected(&self) -> bool;

    // Students

    /// All students, newest first (by creation time)
    async fn list_students(&self) -> StoreResult<Vec<Student>>;

    async fn find_student(&self, id: ObjectId) -> StoreResult<Option<Student>>;

    async fn insert_student(&self, new: NewStudent) -> StoreResult<Student>;

    /// Merge the patch into the record; `None` when the id does not exist
    async fn update_student(&self, id: ObjectId, patch: StudentPatch)
        -> StoreResult<Option<Student>>;

    /// `true` when a record was removed
    async fn delete_student(&self, id: ObjectId) -> StoreResult<bool>;

    /// Case-insensitive substring match across name, course, and email
    async fn search_students(&self, query: &str) -> StoreResult<Vec<Student>>;

    // Courses

    /// All courses, by name ascending
    async fn list_courses(&self) -> StoreResult<Vec<Course>>;

    async fn find_course(&self, id: ObjectId) -> StoreResult<Option<Course>>;

    async fn insert_course(&self, new: NewCourse) -> StoreResult<Course>;

    async fn update_course(&self, id: ObjectId, patch: CoursePatch)
        -> StoreResult<Option<Course>>;

    async fn delete_course(&self, id: ObjectId) -> StoreResult<bool>;

    /// Students whose `course` field equals `course` by string equality
    async fn count_students_in_course(&self, course: &str) -> StoreResult<u64>;

    // Reporting

    /// Counters for the dashboard, read-only
    async fn dashboard_counts(&self) -> StoreResult<DashboardCounts>;
}
