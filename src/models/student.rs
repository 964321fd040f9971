//! Student records
//!
//! The `course` field is a soft reference: it stores a course id hex string
//! or name as free text and is never checked against the courses collection.

use std::sync::LazyLock;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FieldErrors, Status, ValidationError};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Student document as stored in the `students` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub course: String,
    pub enrollment_date: bson::DateTime,
    #[serde(default)]
    pub status: Status,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl Student {
    /// True when any of name, course, or email contains `needle`
    /// case-insensitively. Used by the in-memory search.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.course.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
    }
}

/// Validated input for a student insert
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course: String,
    pub enrollment_date: DateTime<Utc>,
    pub status: Status,
}

/// Validated partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: Option<Status>,
}

/// Request body for `POST /api/students`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateStudent {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: Option<Status>,
}

impl CreateStudent {
    pub fn validate(self) -> Result<NewStudent, ValidationError> {
        let mut errs = FieldErrors::default();

        let name = errs.require("name", self.name.as_deref()).map(str::to_owned);
        let email = errs
            .require("email", self.email.as_deref())
            .map(str::to_owned);
        let course = errs
            .require("course", self.course.as_deref())
            .map(str::to_owned);
        if self.enrollment_date.is_none() {
            errs.push("enrollmentDate is required");
        }
        if let Some(email) = email.as_deref() {
            if !EMAIL_RE.is_match(email) {
                errs.push(format!("{} is not a valid email", email));
            }
        }
        errs.into_result()?;

        // All fields are Some once into_result passed
        Ok(NewStudent {
            name: name.unwrap(),
            email: email.unwrap(),
            course: course.unwrap(),
            enrollment_date: self.enrollment_date.unwrap(),
            status: self.status.unwrap_or_default(),
        })
    }
}

/// Request body for `PUT /api/students/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: Option<Status>,
}

impl UpdateStudent {
    pub fn validate(self) -> Result<StudentPatch, ValidationError> {
        let mut errs = FieldErrors::default();

        for (field, value) in [
            ("name", self.name.as_deref()),
            ("email", self.email.as_deref()),
            ("course", self.course.as_deref()),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                errs.push(format!("{} cannot be blank", field));
            }
        }
        if let Some(email) = self.email.as_deref() {
            if !email.trim().is_empty() && !EMAIL_RE.is_match(email.trim()) {
                errs.push(format!("{} is not a valid email", email.trim()));
            }
        }
        errs.into_result()?;

        Ok(StudentPatch {
            name: self.name.map(|v| v.trim().to_owned()),
            email: self.email.map(|v| v.trim().to_owned()),
            course: self.course.map(|v| v.trim().to_owned()),
            enrollment_date: self.enrollment_date,
            status: self.status,
        })
    }
}

/// Student as returned to API clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub course: String,
    pub enrollment_date: DateTime<Utc>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Student> for StudentResponse {
    fn from(s: Student) -> Self {
        Self {
            id: s.id.to_hex(),
            name: s.name,
            email: s.email,
            course: s.course,
            enrollment_date: s.enrollment_date.to_chrono(),
            status: s.status,
            created_at: s.created_at.to_chrono(),
            updated_at: s.updated_at.to_chrono(),
        }
    }
}
