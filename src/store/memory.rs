//! In-memory record store
//!
//! Backs the test suite and local development without a running MongoDB.
//! Mirrors the production backend's semantics: uniqueness enforcement,
//! sort orders, partial-update merging, and the soft course reference.

use std::sync::RwLock;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::models::{
    Course, CoursePatch, NewCourse, NewStudent, Status, Student, StudentPatch,
};
use crate::stats::{CourseBreakdown, DashboardCounts};

use super::{RecordStore, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    students: RwLock<Vec<Student>>,
    courses: RwLock<Vec<Course>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ready(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        let students = self.students.read().map_err(lock_err)?;
        let mut out = students.clone();
        // Newest first; ObjectId breaks creation-time ties deterministically
        out.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(out)
    }

    async fn find_student(&self, id: ObjectId) -> StoreResult<Option<Student>> {
        let students = self.students.read().map_err(lock_err)?;
        Ok(students.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_student(&self, new: NewStudent) -> StoreResult<Student> {
        let mut students = self.students.write().map_err(lock_err)?;
        if students.iter().any(|s| s.email == new.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }
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
        students.push(student.clone());
        Ok(student)
    }

    async fn update_student(
        &self,
        id: ObjectId,
        patch: StudentPatch,
    ) -> StoreResult<Option<Student>> {
        let mut students = self.students.write().map_err(lock_err)?;
        if !students.iter().any(|s| s.id == id) {
            return Ok(None);
        }
        if let Some(email) = patch.email.as_deref() {
            if students.iter().any(|s| s.id != id && s.email == email) {
                return Err(StoreError::Duplicate { field: "email" });
            }
        }
        let Some(student) = students.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            student.name = name;
        }
        if let Some(email) = patch.email {
            student.email = email;
        }
        if let Some(course) = patch.course {
            student.course = course;
        }
        if let Some(date) = patch.enrollment_date {
            student.enrollment_date = bson::DateTime::from_chrono(date);
        }
        if let Some(status) = patch.status {
            student.status = status;
        }
        student.updated_at = bson::DateTime::now();
        Ok(Some(student.clone()))
    }

    async fn delete_student(&self, id: ObjectId) -> StoreResult<bool> {
        let mut students = self.students.write().map_err(lock_err)?;
        let before = students.len();
        students.retain(|s| s.id != id);
        Ok(students.len() < before)
    }

    async fn search_students(&self, query: &str) -> StoreResult<Vec<Student>> {
        let students = self.students.read().map_err(lock_err)?;
        let mut out: Vec<Student> = students
            .iter()
            .filter(|s| s.matches(query))
            .cloned()
            .collect();
        out.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(out)
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let courses = self.courses.read().map_err(lock_err)?;
        let mut out = courses.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn find_course(&self, id: ObjectId) -> StoreResult<Option<Course>> {
        let courses = self.courses.read().map_err(lock_err)?;
        Ok(courses.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_course(&self, new: NewCourse) -> StoreResult<Course> {
        let mut courses = self.courses.write().map_err(lock_err)?;
        if courses.iter().any(|c| c.name == new.name) {
            return Err(StoreError::Duplicate { field: "name" });
        }
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
        courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(
        &self,
        id: ObjectId,
        patch: CoursePatch,
    ) -> StoreResult<Option<Course>> {
        let mut courses = self.courses.write().map_err(lock_err)?;
        if !courses.iter().any(|c| c.id == id) {
            return Ok(None);
        }
        if let Some(name) = patch.name.as_deref() {
            if courses.iter().any(|c| c.id != id && c.name == name) {
                return Err(StoreError::Duplicate { field: "name" });
            }
        }
        let Some(course) = courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            course.name = name;
        }
        if let Some(description) = patch.description {
            course.description = description;
        }
        if let Some(duration) = patch.duration {
            course.duration = duration;
        }
        if let Some(status) = patch.status {
            course.status = status;
        }
        course.updated_at = bson::DateTime::now();
        Ok(Some(course.clone()))
    }

    async fn delete_course(&self, id: ObjectId) -> StoreResult<bool> {
        let mut courses = self.courses.write().map_err(lock_err)?;
        let before = courses.len();
        courses.retain(|c| c.id != id);
        Ok(courses.len() < before)
    }

    async fn count_students_in_course(&self, course: &str) -> StoreResult<u64> {
        let students = self.students.read().map_err(lock_err)?;
        Ok(students.iter().filter(|s| s.course == course).count() as u64)
    }

    async fn dashboard_counts(&self) -> StoreResult<DashboardCounts> {
        let students = self.students.read().map_err(lock_err)?;
        let courses = self.courses.read().map_err(lock_err)?;

        let mut by_course: Vec<CourseBreakdown> = Vec::new();
        for student in students.iter() {
            match by_course.iter_mut().find(|b| b.course == student.course) {
                Some(entry) => entry.count += 1,
                None => by_course.push(CourseBreakdown {
                    course: student.course.clone(),
                    count: 1,
                }),
            }
        }
        by_course.sort_by(|a, b| b.count.cmp(&a.count).then(a.course.cmp(&b.course)));

        Ok(DashboardCounts {
            total_students: students.len() as u64,
            active_students: students.iter().filter(|s| s.status == Status::Active).count()
                as u64,
            graduates: students.iter().filter(|s| s.status == Status::Inactive).count() as u64,
            total_courses: courses.len() as u64,
            active_courses: courses.iter().filter(|c| c.status == Status::Active).count() as u64,
            students_by_course: by_course,
        })
    }
}
