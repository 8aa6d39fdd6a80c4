use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Position in the onboarding hierarchy admin -> vendor -> mentor -> student.
///
/// Students are stored as `"user"` (the referral prefix table and the
/// persisted entities use that name) but `"student"` is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Vendor,
    Mentor,
    #[serde(rename = "user")]
    Student,
}

/// Case-insensitive, same names as [`Role::parse`].
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Role::parse(&raw).ok_or_else(|| {
            de::Error::unknown_variant(&raw, &["admin", "vendor", "mentor", "user", "student"])
        })
    }
}

/// Roles the client has no page for are treated as students, who land on the
/// course list.
fn role_or_student<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Role, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Role::parse(&raw).unwrap_or_else(|| {
        tracing::warn!(role = %raw, "unknown role, treating as student");
        Role::Student
    }))
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Vendor, Role::Mentor, Role::Student];

    /// Wire name used in storage and referral prefixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::Mentor => "mentor",
            Role::Student => "user",
        }
    }

    /// Human label, used in access-denied messages.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Vendor => "Vendor",
            Role::Mentor => "Mentor",
            Role::Student => "Student",
        }
    }

    /// The role allowed to create this one.
    pub fn parent(&self) -> Option<Role> {
        match self {
            Role::Admin => None,
            Role::Vendor => Some(Role::Admin),
            Role::Mentor => Some(Role::Vendor),
            Role::Student => Some(Role::Mentor),
        }
    }

    pub fn child(&self) -> Option<Role> {
        match self {
            Role::Admin => Some(Role::Vendor),
            Role::Vendor => Some(Role::Mentor),
            Role::Mentor => Some(Role::Student),
            Role::Student => None,
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "vendor" => Some(Role::Vendor),
            "mentor" => Some(Role::Mentor),
            "user" | "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference the backend may or may not have populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linked<T> {
    Populated(T),
    Id(String),
}

impl<T> Linked<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Linked::Populated(inner) => Some(inner),
            Linked::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRef {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub is_active: bool,
}

fn linked_user_field<'a>(user: &'a Option<Linked<UserRef>>, pick: fn(&UserRef) -> &str) -> Option<&'a str> {
    user.as_ref().and_then(Linked::populated).map(pick)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Option<Linked<UserRef>>,
    pub company_name: String,
    pub description: String,
    pub mentor_count: u32,
    pub student_count: u32,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentorRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Option<Linked<UserRef>>,
    pub specialization: String,
    pub student_count: u32,
    pub vendor_id: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mentor as nested inside a student record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentorRef {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: Option<Linked<UserRef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Option<Linked<UserRef>>,
    pub mentor_id: Option<Linked<MentorRef>>,
    pub referral_code: Option<String>,
    pub is_enrolled: bool,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VendorRecord {
    pub fn name(&self) -> Option<&str> {
        linked_user_field(&self.user_id, |u| u.name.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        linked_user_field(&self.user_id, |u| u.email.as_str())
    }
}

impl MentorRecord {
    pub fn name(&self) -> Option<&str> {
        linked_user_field(&self.user_id, |u| u.name.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        linked_user_field(&self.user_id, |u| u.email.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.user_id
            .as_ref()
            .and_then(Linked::populated)
            .map(|u| u.is_active)
            .unwrap_or(false)
    }
}

impl StudentRecord {
    pub fn name(&self) -> Option<&str> {
        linked_user_field(&self.user_id, |u| u.name.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        linked_user_field(&self.user_id, |u| u.email.as_str())
    }

    pub fn mentor_name(&self) -> Option<&str> {
        self.mentor_id
            .as_ref()
            .and_then(Linked::populated)
            .and_then(|m| linked_user_field(&m.user_id, |u| u.name.as_str()))
    }

    /// "Enrolled" once paid, "Registered" before.
    pub fn status_label(&self) -> &'static str {
        if self.is_enrolled {
            "Enrolled"
        } else {
            "Registered"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub duration: Option<u32>,
    pub price: Option<f64>,
    pub max_students: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub vendor_id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Student as nested inside an enrollment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRef {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: Option<Linked<UserRef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseRef {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrollmentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub student_id: Option<Linked<StudentRef>>,
    pub course_id: Option<Linked<CourseRef>>,
    pub mentor_id: Option<Value>,
    pub vendor_id: Option<Value>,
    pub price_paid: Option<f64>,
    pub enrolled_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnrollmentRecord {
    pub fn student_name(&self) -> Option<&str> {
        self.student_id
            .as_ref()
            .and_then(Linked::populated)
            .and_then(|s| linked_user_field(&s.user_id, |u| u.name.as_str()))
    }

    pub fn course_title(&self) -> Option<&str> {
        self.course_id
            .as_ref()
            .and_then(Linked::populated)
            .map(|c| c.title.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferralCodeRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub used_count: u32,
    pub created_at: Option<DateTime<Utc>>,
}

/// `{success, message, data}` wrapper most endpoints answer with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// `data`, or an empty default when the backend left it out.
    pub fn into_data(self) -> T
    where
        T: Default,
    {
        self.data.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub courses_completed: u32,
    pub total_hours: u32,
    pub certificates: u32,
    pub current_streak: u32,
}

/// The signed-in user as returned by the login endpoints and persisted
/// under the `user` storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(deserialize_with = "role_or_student")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enrolled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<UserStats>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub data: SessionUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorKey {
    pub vendor_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentorKey {
    pub mentor_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssuedCode {
    pub code: String,
}

/// Feed entry shown on dashboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub time: String,
}

impl Activity {
    pub fn new(kind: &str, title: &str, description: &str, time: &str) -> Self {
        Self {
            kind: kind.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            time: time.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_accepts_student_alias_and_writes_user() {
        let role: Role = serde_json::from_value(json!("student")).unwrap();
        assert_eq!(role, Role::Student);
        assert_eq!(serde_json::to_value(role).unwrap(), json!("user"));
    }

    #[test]
    fn role_names_are_case_insensitive() {
        let role: Role = serde_json::from_value(json!("Mentor")).unwrap();
        assert_eq!(role, Role::Mentor);
        assert!(serde_json::from_value::<Role>(json!("janitor")).is_err());
    }

    #[test]
    fn session_user_with_unknown_role_is_a_student() {
        let user: SessionUser =
            serde_json::from_value(json!({ "name": "Kim", "email": "kim@x.io", "role": "instructor" })).unwrap();
        assert_eq!(user.role, Role::Student);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Receipt {
        id: u32,
    }

    #[test]
    fn envelope_data_needs_no_default() {
        let empty: Envelope<Receipt> = serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(empty.success);
        assert_eq!(empty.data, None);

        let full: Envelope<Receipt> = serde_json::from_value(json!({ "success": true, "data": { "id": 7 } })).unwrap();
        assert_eq!(full.data, Some(Receipt { id: 7 }));
    }

    #[test]
    fn hierarchy_is_a_chain() {
        assert_eq!(Role::Admin.parent(), None);
        assert_eq!(Role::Student.parent(), Some(Role::Mentor));
        assert_eq!(Role::Mentor.child(), Some(Role::Student));
        assert_eq!(Role::Student.child(), None);
    }

    #[test]
    fn student_record_reads_populated_and_bare_links() {
        let populated: StudentRecord = serde_json::from_value(json!({
            "_id": "s1",
            "userId": { "_id": "u1", "name": "Asha", "email": "asha@x.io" },
            "mentorId": { "userId": { "name": "Ravi" } },
            "isEnrolled": true,
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(populated.name(), Some("Asha"));
        assert_eq!(populated.mentor_name(), Some("Ravi"));
        assert_eq!(populated.status_label(), "Enrolled");

        let bare: StudentRecord = serde_json::from_value(json!({
            "_id": "s2",
            "userId": "u2",
            "mentorId": "m9"
        }))
        .unwrap();
        assert_eq!(bare.name(), None);
        assert_eq!(bare.mentor_name(), None);
        assert_eq!(bare.status_label(), "Registered");
    }

    #[test]
    fn records_keep_unknown_fields() {
        let vendor: VendorRecord = serde_json::from_value(json!({
            "_id": "v1",
            "companyName": "Acme",
            "website": "acme.io"
        }))
        .unwrap();
        assert_eq!(vendor.extra.get("website"), Some(&json!("acme.io")));
        let back = serde_json::to_value(&vendor).unwrap();
        assert_eq!(back["website"], json!("acme.io"));
        assert_eq!(back["companyName"], json!("Acme"));
    }
}
