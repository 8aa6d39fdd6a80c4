//! Page-level search boxes on the dashboards.

use crate::models::{CourseRecord, EnrollmentRecord, MentorRecord, StudentRecord, VendorRecord};

pub trait Searchable {
    /// Fields the search box looks at.
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Blank terms return everything.
pub fn filter<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    if term.trim().is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.matches(term)).collect()
}

impl Searchable for VendorRecord {
    fn search_fields(&self) -> Vec<&str> {
        [self.name(), self.email(), Some(self.company_name.as_str())]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Searchable for MentorRecord {
    fn search_fields(&self) -> Vec<&str> {
        [self.name(), self.email(), Some(self.specialization.as_str())]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Searchable for StudentRecord {
    fn search_fields(&self) -> Vec<&str> {
        [self.name(), self.email()].into_iter().flatten().collect()
    }
}

impl Searchable for CourseRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str()]
    }
}

impl Searchable for EnrollmentRecord {
    fn search_fields(&self) -> Vec<&str> {
        [self.student_name(), self.course_title()].into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vendors_match_on_company_or_user() {
        let vendors: Vec<VendorRecord> = serde_json::from_value(json!([
            { "_id": "v1", "companyName": "Acme Learning", "userId": { "name": "Ravi", "email": "ravi@acme.io" } },
            { "_id": "v2", "companyName": "Globex", "userId": "u2" }
        ]))
        .unwrap();
        assert_eq!(filter(&vendors, "acme").len(), 1);
        assert_eq!(filter(&vendors, "RAVI").len(), 1);
        assert_eq!(filter(&vendors, "glob")[0].id, "v2");
        assert_eq!(filter(&vendors, "  ").len(), 2);
    }

    #[test]
    fn enrollments_match_student_or_course() {
        let enrollments: Vec<EnrollmentRecord> = serde_json::from_value(json!([
            { "_id": "e1", "studentId": { "userId": { "name": "Asha" } }, "courseId": { "title": "Rust 101" } },
            { "_id": "e2", "studentId": "s2", "courseId": "c2" }
        ]))
        .unwrap();
        assert_eq!(filter(&enrollments, "rust").len(), 1);
        assert_eq!(filter(&enrollments, "asha")[0].id, "e1");
        assert!(filter(&enrollments, "s2").is_empty());
    }
}
