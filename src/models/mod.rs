//! # Entity Models
//!
//! Document types for the two record collections, the request DTOs accepted
//! at the HTTP boundary, and the response DTOs returned to clients.
//!
//! Request DTOs reject unknown fields and carry an explicit `validate()`
//! step so missing or blank required fields produce deterministic messages.

pub mod course;
pub mod student;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use course::{Course, CoursePatch, CourseResponse, CreateCourse, NewCourse, UpdateCourse};
pub use student::{
    CreateStudent, NewStudent, Student, StudentPatch, StudentResponse, UpdateStudent,
};

/// Record lifecycle status, shared by students and courses.
///
/// For students, `inactive` doubles as "graduated" in the dashboard stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

/// A request body failed field validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Collects missing/blank field names into one deterministic message.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    problems: Vec<String>,
}

impl FieldErrors {
    pub fn require<'a>(&mut self, field: &str, value: Option<&'a str>) -> Option<&'a str> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Some(v),
            None => {
                self.problems.push(format!("{} is required", field));
                None
            }
        }
    }

    pub fn push(&mut self, problem: impl Into<String>) {
        self.problems.push(problem.into());
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self.problems.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Status::Active).unwrap(), "\"active\"");
        assert_eq!(
            serde_json::to_string(&Status::Inactive).unwrap(),
            "\"inactive\""
        );
    }

    #[test]
    fn test_status_default_is_active() {
        assert_eq!(Status::default(), Status::Active);
    }

    #[test]
    fn test_field_errors_join_messages() {
        let mut errs = FieldErrors::default();
        errs.require("name", None);
        errs.require("email", Some("   "));
        let err = errs.into_result().unwrap_err();
        assert_eq!(err.0, "name is required, email is required");
    }
}
