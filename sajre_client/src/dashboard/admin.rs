use super::search::filter;
use super::DashboardError;
use crate::api::{ApiClient, Payload};
use crate::error::ApiError;
use crate::models::{Activity, CourseRecord, EnrollmentRecord, MentorRecord, Role, StudentRecord, VendorRecord};
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// Keys the edit form never offers.
pub const NON_EDITABLE: [&str; 9] = [
    "_id",
    "userId",
    "vendorId",
    "mentorId",
    "studentId",
    "courseId",
    "__v",
    "createdAt",
    "updatedAt",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminCounts {
    pub total_vendors: u64,
    pub total_mentors: u64,
    pub total_students: u64,
    pub total_courses: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecentSignups {
    pub vendors: Vec<VendorRecord>,
    pub mentors: Vec<MentorRecord>,
    pub students: Vec<StudentRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminDashboardData {
    pub counts: AdminCounts,
    pub recent_activities: RecentSignups,
    pub analytics_data: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct AdminDashboard {
    pub vendors: Vec<VendorRecord>,
    pub mentors: Vec<MentorRecord>,
    pub students: Vec<StudentRecord>,
    pub courses: Vec<CourseRecord>,
    pub enrollments: Vec<EnrollmentRecord>,
    pub data: AdminDashboardData,
}

/// Search results across the admin tables.
#[derive(Debug, PartialEq)]
pub struct AdminMatches<'a> {
    pub vendors: Vec<&'a VendorRecord>,
    pub mentors: Vec<&'a MentorRecord>,
    pub students: Vec<&'a StudentRecord>,
    pub courses: Vec<&'a CourseRecord>,
    pub enrollments: Vec<&'a EnrollmentRecord>,
}

impl AdminDashboard {
    /// Loads every table at once; one failure fails the whole load.
    #[tracing::instrument(name = "Load admin dashboard", skip_all)]
    pub async fn load(api: &ApiClient, session: &Session) -> Result<Self, DashboardError> {
        let (_, token) = session.require_role(Role::Admin)?;
        let (vendors, mentors, students, courses, enrollments, dashboard) = futures::try_join!(
            api.get_all_vendors(token),
            api.get_all_mentors(token),
            api.get_all_students(token),
            api.get_all_courses(token),
            api.get_all_enrollments(token),
            api.get_dashboard::<AdminDashboardData>(token),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "failed to load admin data");
            e
        })?;
        Ok(Self {
            vendors: vendors.into_data(),
            mentors: mentors.into_data(),
            students: students.into_data(),
            courses: courses.into_data(),
            enrollments: enrollments.into_data(),
            data: dashboard.into_data(),
        })
    }

    /// Slices of the role pie chart.
    pub fn role_distribution(&self) -> [(&'static str, u64); 4] {
        let counts = &self.data.counts;
        [
            ("Vendors", counts.total_vendors),
            ("Mentors", counts.total_mentors),
            ("Students", counts.total_students),
            ("Courses", counts.total_courses),
        ]
    }

    /// Recent sign-ups, newest first.
    pub fn activity_feed(&self) -> Vec<Activity> {
        let recent = &self.data.recent_activities;
        let mut entries: Vec<(Option<DateTime<Utc>>, Activity)> = Vec::new();
        for v in &recent.vendors {
            entries.push((v.created_at, joined("New Vendor", &v.company_name, v.created_at)));
        }
        for m in &recent.mentors {
            entries.push((m.created_at, joined("New Mentor", m.name().unwrap_or("Unknown"), m.created_at)));
        }
        for s in &recent.students {
            entries.push((s.created_at, joined("New Student", s.name().unwrap_or("Unknown"), s.created_at)));
        }
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries.into_iter().map(|(_, activity)| activity).collect()
    }

    pub fn search(&self, term: &str) -> AdminMatches<'_> {
        AdminMatches {
            vendors: filter(&self.vendors, term),
            mentors: filter(&self.mentors, term),
            students: filter(&self.students, term),
            courses: filter(&self.courses, term),
            enrollments: filter(&self.enrollments, term),
        }
    }
}

fn joined(title: &str, who: &str, at: Option<DateTime<Utc>>) -> Activity {
    let time = at
        .map(|t| t.format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_default();
    Activity::new("user", title, &format!("{} joined", who), &time)
}

/// Tables the admin can edit and delete from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vendor,
    Mentor,
    Student,
    Course,
    Enrollment,
}

impl EntityKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "vendor" => Some(Self::Vendor),
            "mentor" => Some(Self::Mentor),
            "student" => Some(Self::Student),
            "course" => Some(Self::Course),
            "enrollment" => Some(Self::Enrollment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Mentor => "mentor",
            Self::Student => "student",
            Self::Course => "course",
            Self::Enrollment => "enrollment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields the edit form shows for `item`, in key order.
pub fn editable_fields(item: &Map<String, Value>) -> Vec<(&str, &Value)> {
    item.iter()
        .filter(|(key, _)| !NON_EDITABLE.contains(&key.as_str()))
        .map(|(key, value)| (key.as_str(), value))
        .collect()
}

/// Splits an edited record into its id and the update payload.
pub fn edit_payload(mut item: Map<String, Value>) -> Option<(String, Payload)> {
    let id = match item.remove("_id")? {
        Value::String(id) => id,
        other => other.to_string(),
    };
    Some((id, item))
}

/// Saves an edited record. The payload is everything but `_id`.
#[tracing::instrument(name = "Admin save", skip(api, token, item))]
pub async fn save(api: &ApiClient, token: &str, kind: EntityKind, item: Map<String, Value>) -> Result<Value, DashboardError> {
    let (id, payload) =
        edit_payload(item).ok_or_else(|| DashboardError::Rejected(format!("Failed to save {}.", kind)))?;
    let result = match kind {
        EntityKind::Vendor => api.update_vendor(&id, &payload, token).await,
        EntityKind::Mentor => api.update_mentor(&id, &payload, token).await,
        EntityKind::Student => api.update_student(&id, &payload, token).await,
        EntityKind::Course => api.update_course(&id, &payload, token).await,
        EntityKind::Enrollment => api.update_enrollment(&id, &payload, token).await,
    };
    log_outcome("save", kind, result).map_err(DashboardError::from)
}

#[tracing::instrument(name = "Admin delete", skip(api, token))]
pub async fn delete(api: &ApiClient, token: &str, kind: EntityKind, id: &str) -> Result<Value, DashboardError> {
    let result = match kind {
        EntityKind::Vendor => api.delete_vendor(id, token).await,
        EntityKind::Mentor => api.delete_mentor(id, token).await,
        EntityKind::Student => api.delete_student(id, token).await,
        EntityKind::Course => api.delete_course(id, token).await,
        EntityKind::Enrollment => api.delete_enrollment(id, token).await,
    };
    log_outcome("delete", kind, result).map_err(DashboardError::from)
}

fn log_outcome(action: &str, kind: EntityKind, result: Result<Value, ApiError>) -> Result<Value, ApiError> {
    match &result {
        Ok(_) => tracing::info!("{} {}d successfully", kind, action),
        Err(e) => tracing::error!(error = %e, "failed to {} {}", action, kind),
    }
    result
}
