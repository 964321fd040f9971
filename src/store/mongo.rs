//! MongoDB-backed record store
//!
//! The connection is established lazily on first use and memoized, including
//! the in-flight attempt: concurrent cold-start callers wait on one shared
//! initialization instead of racing separate connections, and a failed
//! attempt is not cached, so the next request retries.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use futures_util::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Database, IndexModel};
use tokio::sync::OnceCell;

use crate::models::{
    Course, CoursePatch, NewCourse, NewStudent, Status, Student, StudentPatch,
};
use crate::observability::logger;
use crate::stats::{CourseBreakdown, DashboardCounts};

use super::{RecordStore, StoreError, StoreResult};

const STUDENTS: &str = "students";
const COURSES: &str = "courses";

pub struct MongoStore {
    uri: String,
    db_name: String,
    handle: OnceCell<Database>,
    connected: AtomicBool,
}

impl MongoStore {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
            handle: OnceCell::new(),
            connected: AtomicBool::new(false),
        }
    }

    /// Get the cached database handle, connecting on first call.
    async fn database(&self) -> StoreResult<&Database> {
        self.handle
            .get_or_try_init(|| async {
                let client = Client::with_uri_str(&self.uri)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                let db = client.database(&self.db_name);

                // The driver connects lazily too; ping so an unreachable
                // server fails here instead of inside the first handler.
                db.run_command(doc! { "ping": 1 })
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;

                ensure_indexes(&db).await?;

                self.connected.store(true, Ordering::SeqCst);
                logger::info("STORE_CONNECTED", &[("database", &self.db_name)]);
                Ok(db)
            })
            .await
    }

    fn students(&self, db: &Database) -> mongodb::Collection<Student> {
        db.collection::<Student>(STUDENTS)
    }

    fn courses(&self, db: &Database) -> mongodb::Collection<Course> {
        db.collection::<Course>(COURSES)
    }
}

/// Unique indexes backing the global uniqueness invariants.
async fn ensure_indexes(db: &Database) -> StoreResult<()> {
    let unique = IndexOptions::builder().unique(true).build();

    db.collection::<Student>(STUDENTS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique.clone())
                .build(),
        )
        .await
        .map_err(StoreError::backend)?;

    db.collection::<Course>(COURSES)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(unique)
                .build(),
        )
        .await
        .map_err(StoreError::backend)?;

    Ok(())
}

/// Identify a unique-index violation (code 11000) and the offending field.
fn duplicate_field(err: &mongodb::error::Error) -> Option<&'static str> {
    let (code, message) = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => (we.code, we.message.as_str()),
        ErrorKind::Command(ce) => (ce.code, ce.message.as_str()),
        _ => return None,
    };
    if code != 11000 {
        return None;
    }
    if message.contains("email") {
        Some("email")
    } else {
        Some("name")
    }
}

fn map_write_err(err: mongodb::error::Error) -> StoreError {
    match duplicate_field(&err) {
        Some(field) => StoreError::Duplicate { field },
        None => StoreError::backend(err),
    }
}

fn student_set(patch: StudentPatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = patch.name {
        set.insert("name", name);
    }
    if let Some(email) = patch.email {
        set.insert("email", email);
    }
    if let Some(course) = patch.course {
        set.insert("course", course);
    }
    if let Some(date) = patch.enrollment_date {
        set.insert("enrollmentDate", bson::DateTime::from_chrono(date));
    }
    if let Some(status) = patch.status {
        set.insert("status", status.as_str());
    }
    set.insert("updatedAt", bson::DateTime::now());
    set
}

fn course_set(patch: CoursePatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = patch.name {
        set.insert("name", name);
    }
    if let Some(description) = patch.description {
        set.insert("description", description);
    }
    if let Some(duration) = patch.duration {
        set.insert("duration", duration as i64);
    }
    if let Some(status) = patch.status {
        set.insert("status", status.as_str());
    }
    set.insert("updatedAt", bson::DateTime::now());
    set
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn ready(&self) -> StoreResult<()> {
        self.database().await.map(|_| ())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        let db = self.database().await?;
        self.students(db)
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(StoreError::backend)?
            .try_collect()
            .await
            .map_err(StoreError::backend)
    }

    async fn find_student(&self, id: ObjectId) -> StoreResult<Option<Student>> {
        let db = self.database().await?;
        self.students(db)
            .find_one(doc! { "_id": id })
            .await
            .map_err(StoreError::backend)
    }

    async fn insert_student(&self, new: NewStudent) -> StoreResult<Student> {
        let db = self.database().await?;
        let now = bson::DateTime::now();
        let student = Student {
            id: ObjectId::new(),
            name: new.name,
            email: new.email,
            course: new.course,
            enrollment_date: bson::DateTime::from_chrono(new.enrollment_date),
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        self.students(db)
            .insert_one(&student)
            .await
            .map_err(map_write_err)?;
        Ok(student)
    }

    async fn update_student(
        &self,
        id: ObjectId,
        patch: StudentPatch,
    ) -> StoreResult<Option<Student>> {
        let db = self.database().await?;
        self.students(db)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": student_set(patch) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_write_err)
    }

    async fn delete_student(&self, id: ObjectId) -> StoreResult<bool> {
        let db = self.database().await?;
        let result = self
            .students(db)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(StoreError::backend)?;
        Ok(result.deleted_count > 0)
    }

    async fn search_students(&self, query: &str) -> StoreResult<Vec<Student>> {
        let db = self.database().await?;
        // Escape metacharacters so the user's text is matched literally
        let pattern = regex::escape(query);
        let clause = |field: &str| doc! { field: { "$regex": &pattern, "$options": "i" } };
        self.students(db)
            .find(doc! { "$or": [clause("name"), clause("course"), clause("email")] })
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(StoreError::backend)?
            .try_collect()
            .await
            .map_err(StoreError::backend)
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let db = self.database().await?;
        self.courses(db)
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await
            .map_err(StoreError::backend)?
            .try_collect()
            .await
            .map_err(StoreError::backend)
    }

    async fn find_course(&self, id: ObjectId) -> StoreResult<Option<Course>> {
        let db = self.database().await?;
        self.courses(db)
            .find_one(doc! { "_id": id })
            .await
            .map_err(StoreError::backend)
    }

    async fn insert_course(&self, new: NewCourse) -> StoreResult<Course> {
        let db = self.database().await?;
        let now = bson::DateTime::now();
        let course = Course {
            id: ObjectId::new(),
            name: new.name,
            description: new.description,
            duration: new.duration,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        self.courses(db)
            .insert_one(&course)
            .await
            .map_err(map_write_err)?;
        Ok(course)
    }

    async fn update_course(
        &self,
        id: ObjectId,
        patch: CoursePatch,
    ) -> StoreResult<Option<Course>> {
        let db = self.database().await?;
        self.courses(db)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": course_set(patch) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_write_err)
    }

    async fn delete_course(&self, id: ObjectId) -> StoreResult<bool> {
        let db = self.database().await?;
        let result = self
            .courses(db)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(StoreError::backend)?;
        Ok(result.deleted_count > 0)
    }

    async fn count_students_in_course(&self, course: &str) -> StoreResult<u64> {
        let db = self.database().await?;
        self.students(db)
            .count_documents(doc! { "course": course })
            .await
            .map_err(StoreError::backend)
    }

    async fn dashboard_counts(&self) -> StoreResult<DashboardCounts> {
        let db = self.database().await?;
        let students = self.students(db);
        let courses = self.courses(db);

        let total_students = students
            .count_documents(doc! {})
            .await
            .map_err(StoreError::backend)?;
        let active_students = students
            .count_documents(doc! { "status": Status::Active.as_str() })
            .await
            .map_err(StoreError::backend)?;
        let graduates = students
            .count_documents(doc! { "status": Status::Inactive.as_str() })
            .await
            .map_err(StoreError::backend)?;
        let total_courses = courses
            .count_documents(doc! {})
            .await
            .map_err(StoreError::backend)?;
        let active_courses = courses
            .count_documents(doc! { "status": Status::Active.as_str() })
            .await
            .map_err(StoreError::backend)?;

        let groups: Vec<Document> = db
            .collection::<Document>(STUDENTS)
            .aggregate(vec![
                doc! { "$group": { "_id": "$course", "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1, "_id": 1 } },
            ])
            .await
            .map_err(StoreError::backend)?
            .try_collect()
            .await
            .map_err(StoreError::backend)?;

        let students_by_course = groups
            .into_iter()
            .filter_map(|g| {
                let course = g.get_str("_id").ok()?.to_string();
                let count = match g.get("count") {
                    Some(Bson::Int32(n)) => *n as u64,
                    Some(Bson::Int64(n)) => *n as u64,
                    _ => return None,
                };
                Some(CourseBreakdown { course, count })
            })
            .collect();

        Ok(DashboardCounts {
            total_students,
            active_students,
            graduates,
            total_courses,
            active_courses,
            students_by_course,
        })
    }
}
