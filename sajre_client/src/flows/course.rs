//! Admin course creation form.

use super::{is_blank, FlowError};
use crate::api::ApiClient;
use crate::error::ValidationError;
use crate::models::CourseRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const CREATE_FAILED: &str = "Failed to create course. Please try again.";

pub const CATEGORIES: [&str; 10] = [
    "Web Development",
    "Mobile Development",
    "Data Science",
    "Machine Learning",
    "DevOps",
    "UI/UX Design",
    "Digital Marketing",
    "Blockchain",
    "Cybersecurity",
    "Cloud Computing",
];

pub const LEVELS: [&str; 3] = ["beginner", "intermediate", "advanced"];

/// Raw text as typed. Numbers are parsed on validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseForm {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: String,
    pub category: String,
    pub level: String,
    pub max_students: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for CourseForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            duration: String::new(),
            price: String::new(),
            category: String::new(),
            level: LEVELS[0].to_string(),
            max_students: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }
}

/// Field name to message, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

impl From<FieldErrors> for ValidationError {
    fn from(errors: FieldErrors) -> Self {
        ValidationError::new(errors.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub duration: u32,
    pub price: f64,
    pub category: String,
    pub level: String,
    pub max_students: u32,
    pub start_date: String,
    pub end_date: String,
    /// Always null; the backend assigns ownership.
    pub vendor_id: Option<String>,
}

fn required(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str) {
    if is_blank(value) {
        errors.add(field, format!("{} is required", label));
    }
}

fn parsed<T: std::str::FromStr>(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str) -> Option<T> {
    if is_blank(value) {
        return None;
    }
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, format!("{} must be a number", label));
            None
        }
    }
}

impl CourseForm {
    pub fn validate(&self) -> Result<NewCourse, FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "title", "Title", &self.title);
        required(&mut errors, "description", "Description", &self.description);
        required(&mut errors, "duration", "Duration", &self.duration);
        required(&mut errors, "price", "Price", &self.price);
        required(&mut errors, "category", "Category", &self.category);
        required(&mut errors, "maxStudents", "Max students", &self.max_students);
        required(&mut errors, "startDate", "Start date", &self.start_date);
        required(&mut errors, "endDate", "End date", &self.end_date);

        let duration = parsed::<u32>(&mut errors, "duration", "Duration", &self.duration);
        let price = parsed::<f64>(&mut errors, "price", "Price", &self.price).filter(|p| p.is_finite());
        let max_students = parsed::<u32>(&mut errors, "maxStudents", "Max students", &self.max_students);

        match (duration, price, max_students) {
            (Some(duration), Some(price), Some(max_students)) if errors.is_empty() => Ok(NewCourse {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                duration,
                price,
                category: self.category.clone(),
                level: if is_blank(&self.level) {
                    LEVELS[0].to_string()
                } else {
                    self.level.to_lowercase()
                },
                max_students,
                start_date: self.start_date.clone(),
                end_date: self.end_date.clone(),
                vendor_id: None,
            }),
            _ => {
                if price.is_none() && errors.get("price").is_none() {
                    errors.add("price", "Price must be a number");
                }
                Err(errors)
            }
        }
    }
}

/// Validates and creates the course with the admin token.
#[tracing::instrument(name = "Create course", skip_all, fields(title = %form.title))]
pub async fn create_course(api: &ApiClient, token: &str, form: &CourseForm) -> Result<CourseRecord, FlowError> {
    let course = form.validate().map_err(ValidationError::from)?;
    let response = api.create_course(&course, token).await.map_err(|e| {
        tracing::error!(error = %e, "failed to create course");
        FlowError::Rejected(CREATE_FAILED.to_string())
    })?;
    if !response.success {
        return Err(FlowError::Rejected(
            response.message.unwrap_or_else(|| CREATE_FAILED.to_string()),
        ));
    }
    Ok(response.data.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> CourseForm {
        CourseForm {
            title: "  Rust 101 ".into(),
            description: "Ownership".into(),
            duration: "8".into(),
            price: "4999.5".into(),
            category: CATEGORIES[0].into(),
            max_students: "30".into(),
            start_date: "2025-01-01".into(),
            end_date: "2025-03-01".into(),
            ..CourseForm::default()
        }
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = CourseForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 8);
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("maxStudents"), Some("Max students is required"));
        assert_eq!(errors.get("level"), None);
    }

    #[test]
    fn valid_form_parses_numbers_and_nulls_vendor() {
        let course = filled().validate().unwrap();
        assert_eq!(course.title, "Rust 101");
        assert_eq!(course.duration, 8);
        assert_eq!(course.price, 4999.5);
        assert_eq!(course.level, "beginner");
        let body = serde_json::to_value(&course).unwrap();
        assert!(body["vendorId"].is_null());
        assert_eq!(body["maxStudents"], 30);
    }

    #[test]
    fn unparsable_number_is_a_field_error() {
        let form = CourseForm {
            duration: "eight".into(),
            ..filled()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("duration"), Some("Duration must be a number"));
        assert_eq!(errors.len(), 1);
    }
}
