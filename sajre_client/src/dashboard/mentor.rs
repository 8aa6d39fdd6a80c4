use super::search::filter;
use super::DashboardError;
use crate::api::ApiClient;
use crate::models::{Activity, CourseRecord, EnrollmentRecord, Role, StudentRecord};
use crate::session::Session;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentorStats {
    pub total_students: u64,
    pub enrolled_students: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentorDashboardData {
    pub stats: MentorStats,
    pub recent_students: Vec<StudentRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shown when the dashboard endpoints are unreachable.
pub fn placeholder_activities() -> Vec<Activity> {
    vec![
        Activity::new(
            "course",
            "Course Completed",
            "Sarah Johnson completed React Fundamentals",
            "30 minutes ago",
        ),
        Activity::new(
            "user",
            "New Student Enrollment",
            "Mike Chen enrolled in Advanced JavaScript",
            "2 hours ago",
        ),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct MentorDashboard {
    pub data: MentorDashboardData,
    pub courses: Vec<CourseRecord>,
    pub activities: Vec<Activity>,
    pub enrollments: Vec<EnrollmentRecord>,
    pub students: Vec<StudentRecord>,
    /// Set when the load fell back to placeholder data.
    pub degraded: bool,
}

impl MentorDashboard {
    /// Only the role check can fail. Network failures degrade to zeroed stats
    /// and placeholder activities.
    #[tracing::instrument(name = "Load mentor dashboard", skip_all)]
    pub async fn load(api: &ApiClient, session: &Session) -> Result<Self, DashboardError> {
        let (_, token) = session.require_role(Role::Mentor)?;
        let loaded = futures::try_join!(
            api.get_mentor_dashboard::<MentorDashboardData>(token),
            api.get_mentor_courses(token),
            api.get_recent_activities(token),
            api.get_mentor_enrollments(token),
        );
        let mut dashboard = match loaded {
            Ok((data, courses, activities, enrollments)) => {
                let data = data.into_data();
                Self {
                    students: data.recent_students.clone(),
                    data,
                    courses: courses.into_data(),
                    activities: activities.into_data(),
                    enrollments: enrollments.into_data(),
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "mentor dashboard unavailable, using placeholders");
                return Ok(Self {
                    activities: placeholder_activities(),
                    degraded: true,
                    ..Self::default()
                });
            }
        };
        match api.get_mentor_students(token).await {
            Ok(students) => dashboard.students = students.into_data(),
            Err(e) => tracing::warn!(error = %e, "failed to fetch students"),
        }
        Ok(dashboard)
    }

    /// Enrolled vs registered-only students.
    pub fn referral_split(&self) -> [(&'static str, u64); 2] {
        let stats = &self.data.stats;
        [
            ("Enrolled", stats.enrolled_students),
            ("Registered", stats.total_students.saturating_sub(stats.enrolled_students)),
        ]
    }

    pub fn set_students(&mut self, students: Vec<StudentRecord>) {
        self.students = students;
    }

    pub fn search_students(&self, term: &str) -> Vec<&StudentRecord> {
        filter(&self.students, term)
    }
}
