//! Dashboard aggregates
//!
//! Shapes the raw counters read by the store into the dashboard payload.
//! "Graduates" are students with status `inactive`; the status field is
//! overloaded to mean both deactivated and completed.

use serde::Serialize;

/// Raw counters from one read-only pass over the store
#[derive(Debug, Clone, Default)]
pub struct DashboardCounts {
    pub total_students: u64,
    pub active_students: u64,
    pub graduates: u64,
    pub total_courses: u64,
    pub active_courses: u64,
    pub students_by_course: Vec<CourseBreakdown>,
}

/// Student count per `course` value
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CourseBreakdown {
    pub course: String,
    pub count: u64,
}

/// Payload for `GET /api/dashboard/stats`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: u64,
    pub active_students: u64,
    pub total_courses: u64,
    pub active_courses: u64,
    pub graduates: u64,
    pub success_rate: u32,
    pub students_by_course: Vec<CourseBreakdown>,
}

impl DashboardStats {
    pub fn from_counts(counts: DashboardCounts) -> Self {
        Self {
            success_rate: success_rate(counts.graduates, counts.total_students),
            total_students: counts.total_students,
            active_students: counts.active_students,
            total_courses: counts.total_courses,
            active_courses: counts.active_courses,
            graduates: counts.graduates,
            students_by_course: counts.students_by_course,
        }
    }
}

/// round(graduates / total * 100), defined as 0 when there are no students
pub fn success_rate(graduates: u64, total_students: u64) -> u32 {
    if total_students == 0 {
        return 0;
    }
    ((graduates as f64 / total_students as f64) * 100.0).round() as u32
}
