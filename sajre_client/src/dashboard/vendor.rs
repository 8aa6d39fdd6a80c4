use super::search::filter;
use super::DashboardError;
use crate::api::ApiClient;
use crate::models::{MentorRecord, Role, StudentRecord};
use crate::session::Session;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const LOAD_FAILED: &str = "Failed to load dashboard data";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorCounts {
    pub total_mentors: u64,
    pub total_students: u64,
    pub enrolled_students: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RevenuePoint {
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceMetrics {
    pub course_completion: f64,
    pub student_satisfaction: f64,
    pub mentor_retention: f64,
    pub revenue_growth: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorDashboard {
    pub counts: VendorCounts,
    pub mentors: Vec<MentorRecord>,
    pub students: Vec<StudentRecord>,
    pub revenue_data: Vec<RevenuePoint>,
    pub performance_metrics: PerformanceMetrics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: &'static str,
    pub value: f64,
    pub target: f64,
}

impl Metric {
    pub fn on_target(&self) -> bool {
        self.value >= self.target
    }
}

impl VendorDashboard {
    /// A failed load also ends the session; the caller goes back to login.
    #[tracing::instrument(name = "Load vendor dashboard", skip_all)]
    pub async fn load(api: &ApiClient, session: &mut Session) -> Result<Self, DashboardError> {
        let token = {
            let (_, token) = session.require_role(Role::Vendor)?;
            token.to_string()
        };
        let result = match api.get_vendor_dashboard::<VendorDashboard>(&token).await {
            Ok(res) if res.success => Ok(res.into_data()),
            Ok(res) => Err(DashboardError::Rejected(
                res.message.filter(|m| !m.is_empty()).unwrap_or_else(|| LOAD_FAILED.to_string()),
            )),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            tracing::error!(error = %e, "vendor dashboard failed, signing out");
            session.sign_out()?;
        }
        result
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue_data.iter().map(|p| p.revenue).sum()
    }

    pub fn team_split(&self) -> [(&'static str, u64); 2] {
        [
            ("Mentors", self.counts.total_mentors),
            ("Students", self.counts.total_students),
        ]
    }

    pub fn performance(&self) -> [Metric; 4] {
        let m = &self.performance_metrics;
        [
            Metric {
                name: "Course Completion",
                value: m.course_completion,
                target: 90.0,
            },
            Metric {
                name: "Student Satisfaction",
                value: m.student_satisfaction,
                target: 95.0,
            },
            Metric {
                name: "Mentor Retention",
                value: m.mentor_retention,
                target: 85.0,
            },
            Metric {
                name: "Revenue Growth",
                value: m.revenue_growth,
                target: 20.0,
            },
        ]
    }

    pub fn search_mentors(&self, term: &str) -> Vec<&MentorRecord> {
        filter(&self.mentors, term)
    }

    pub fn search_students(&self, term: &str) -> Vec<&StudentRecord> {
        filter(&self.students, term)
    }
}
