//! Course records

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FieldErrors, Status, ValidationError};

/// Course document as stored in the `courses` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub duration: u32,
    #[serde(default)]
    pub status: Status,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

/// Validated input for a course insert
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub description: String,
    pub duration: u32,
    pub status: Status,
}

/// Validated partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
    pub status: Option<Status>,
}

/// Request body for `POST /api/courses`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCourse {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
    pub status: Option<Status>,
}

impl CreateCourse {
    pub fn validate(self) -> Result<NewCourse, ValidationError> {
        let mut errs = FieldErrors::default();

        let name = errs.require("name", self.name.as_deref()).map(str::to_owned);
        let description = errs
            .require("description", self.description.as_deref())
            .map(str::to_owned);
        match self.duration {
            None => errs.push("duration is required"),
            Some(0) => errs.push("duration must be greater than zero"),
            Some(_) => {}
        }
        errs.into_result()?;

        Ok(NewCourse {
            name: name.unwrap(),
            description: description.unwrap(),
            duration: self.duration.unwrap(),
            status: self.status.unwrap_or_default(),
        })
    }
}

/// Request body for `PUT /api/courses/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCourse {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
    pub status: Option<Status>,
}

impl UpdateCourse {
    pub fn validate(self) -> Result<CoursePatch, ValidationError> {
        let mut errs = FieldErrors::default();

        for (field, value) in [
            ("name", self.name.as_deref()),
            ("description", self.description.as_deref()),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                errs.push(format!("{} cannot be blank", field));
            }
        }
        if self.duration == Some(0) {
            errs.push("duration must be greater than zero");
        }
        errs.into_result()?;

        Ok(CoursePatch {
            name: self.name.map(|v| v.trim().to_owned()),
            description: self.description.map(|v| v.trim().to_owned()),
            duration: self.duration,
            status: self.status,
        })
    }
}

/// Course as returned to API clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration: u32,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(c: Course) -> Self {
        Self {
            id: c.id.to_hex(),
            name: c.name,
            description: c.description,
            duration: c.duration,
            status: c.status,
            created_at: c.created_at.to_chrono(),
            updated_at: c.updated_at.to_chrono(),
        }
    }
}
