//! JSON-over-HTTP client for the platform backend.
//!
//! One attempt per call: no retries and no cancellation. Non-2xx answers
//! become [`ApiError::Http`] carrying the server's `message`/`error` text.

use crate::error::ApiError;
use crate::models::{
    Activity, AdminLoginResponse, CourseRecord, EnrollmentRecord, Envelope, IssuedCode, LoginResponse, MentorKey,
    MentorRecord, ReferralCodeRecord, Role, StudentRecord, VendorKey, VendorRecord,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

pub type Payload = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(token: Option<&str>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| ApiError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    #[tracing::instrument(name = "API request", skip(self, body, token), fields(base = %self.base_url))]
    async fn http<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .headers(Self::headers(token)?);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| {
            tracing::error!("Request failed to send: {:?}", e);
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        let data: Value = serde_json::from_str(&text).unwrap_or_else(|_| json!({}));

        if !status.is_success() {
            let message = ["message", "error"]
                .iter()
                .filter_map(|key| data.get(*key).and_then(Value::as_str))
                .find(|msg| !msg.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed: {}", status.as_u16()));
            tracing::debug!(status = status.as_u16(), %message, "request rejected");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_value(data).map_err(ApiError::Decode)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        self.http(Method::GET, path, None, token).await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.http(method, path, Some(body), token).await
    }

    /// Generic POST, used for endpoints without a dedicated helper.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B, token: Option<&str>) -> Result<Value, ApiError> {
        self.send(Method::POST, path, body, token).await
    }

    // Auth

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.send(
            Method::POST,
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    pub async fn register_student<B: Serialize>(&self, payload: &B) -> Result<Value, ApiError> {
        self.send(Method::POST, "/api/auth/register/student", payload, None).await
    }

    pub async fn register_vendor<B: Serialize>(&self, payload: &B) -> Result<Value, ApiError> {
        self.send(Method::POST, "/api/auth/register/vendor", payload, None).await
    }

    pub async fn register_mentor<B: Serialize>(&self, payload: &B) -> Result<Value, ApiError> {
        self.send(Method::POST, "/api/auth/register/mentor", payload, None).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<Value, ApiError> {
        self.send(
            Method::POST,
            "/api/auth/verify-otp",
            &json!({ "email": email, "otp": otp }),
            None,
        )
        .await
    }

    // Public

    pub async fn get_public_courses(&self) -> Result<Envelope<Vec<CourseRecord>>, ApiError> {
        self.get("/api/courses", None).await
    }

    pub async fn contact_us<B: Serialize>(&self, payload: &B) -> Result<Value, ApiError> {
        self.send(Method::POST, "/api/contact", payload, None).await
    }

    // Admin

    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AdminLoginResponse, ApiError> {
        self.send(
            Method::POST,
            "/api/admin/login",
            &json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    pub async fn get_dashboard<T: DeserializeOwned>(&self, token: &str) -> Result<Envelope<T>, ApiError> {
        self.get("/api/admin/dashboard", Some(token)).await
    }

    pub async fn create_vendor<B: Serialize>(&self, payload: &B, token: &str) -> Result<Envelope<VendorKey>, ApiError> {
        self.send(Method::POST, "/api/admin/create-vendor", payload, Some(token)).await
    }

    pub async fn get_all_vendors(&self, token: &str) -> Result<Envelope<Vec<VendorRecord>>, ApiError> {
        self.get("/api/admin/vendors", Some(token)).await
    }

    pub async fn get_all_mentors(&self, token: &str) -> Result<Envelope<Vec<MentorRecord>>, ApiError> {
        self.get("/api/admin/mentors", Some(token)).await
    }

    pub async fn get_all_students(&self, token: &str) -> Result<Envelope<Vec<StudentRecord>>, ApiError> {
        self.get("/api/admin/students", Some(token)).await
    }

    pub async fn get_all_courses(&self, token: &str) -> Result<Envelope<Vec<CourseRecord>>, ApiError> {
        self.get("/api/admin/courses", Some(token)).await
    }

    pub async fn get_all_enrollments(&self, token: &str) -> Result<Envelope<Vec<EnrollmentRecord>>, ApiError> {
        self.get("/api/admin/enrollments", Some(token)).await
    }

    pub async fn update_vendor(&self, id: &str, payload: &Payload, token: &str) -> Result<Value, ApiError> {
        self.send(Method::PUT, &format!("/api/admin/vendor/{}", id), payload, Some(token)).await
    }

    pub async fn delete_vendor(&self, id: &str, token: &str) -> Result<Value, ApiError> {
        self.http(Method::DELETE, &format!("/api/admin/vendor/{}", id), None, Some(token)).await
    }

    pub async fn update_mentor(&self, id: &str, payload: &Payload, token: &str) -> Result<Value, ApiError> {
        self.send(Method::PUT, &format!("/api/admin/mentor/{}", id), payload, Some(token)).await
    }

    pub async fn delete_mentor(&self, id: &str, token: &str) -> Result<Value, ApiError> {
        self.http(Method::DELETE, &format!("/api/admin/mentor/{}", id), None, Some(token)).await
    }

    pub async fn update_student(&self, id: &str, payload: &Payload, token: &str) -> Result<Value, ApiError> {
        self.send(Method::PUT, &format!("/api/admin/student/{}", id), payload, Some(token)).await
    }

    pub async fn delete_student(&self, id: &str, token: &str) -> Result<Value, ApiError> {
        self.http(Method::DELETE, &format!("/api/admin/student/{}", id), None, Some(token)).await
    }

    pub async fn generate_admin_referral_code<B: Serialize>(&self, payload: &B, token: &str) -> Result<Value, ApiError> {
        self.send(Method::POST, "/api/admin/referral/generate", payload, Some(token)).await
    }

    pub async fn create_course<B: Serialize>(&self, payload: &B, token: &str) -> Result<Envelope<CourseRecord>, ApiError> {
        self.send(Method::POST, "/api/admin/create-course", payload, Some(token)).await
    }

    pub async fn update_course(&self, id: &str, payload: &Payload, token: &str) -> Result<Value, ApiError> {
        self.send(Method::PUT, &format!("/api/admin/course/{}", id), payload, Some(token)).await
    }

    pub async fn delete_course(&self, id: &str, token: &str) -> Result<Value, ApiError> {
        self.http(Method::DELETE, &format!("/api/admin/course/{}", id), None, Some(token)).await
    }

    pub async fn update_enrollment(&self, id: &str, payload: &Payload, token: &str) -> Result<Value, ApiError> {
        self.send(Method::PUT, &format!("/api/admin/enrollment/{}", id), payload, Some(token)).await
    }

    pub async fn delete_enrollment(&self, id: &str, token: &str) -> Result<Value, ApiError> {
        self.http(Method::DELETE, &format!("/api/admin/enrollment/{}", id), None, Some(token)).await
    }

    // Vendor

    pub async fn get_vendor_dashboard<T: DeserializeOwned>(&self, token: &str) -> Result<Envelope<T>, ApiError> {
        self.get("/api/vendor/dashboard", Some(token)).await
    }

    pub async fn create_mentor<B: Serialize>(&self, payload: &B, token: &str) -> Result<Envelope<MentorKey>, ApiError> {
        self.send(Method::POST, "/api/vendor/create-mentor", payload, Some(token)).await
    }

    pub async fn get_vendor_mentors(&self, token: &str) -> Result<Envelope<Vec<MentorRecord>>, ApiError> {
        self.get("/api/vendor/mentors", Some(token)).await
    }

    pub async fn get_vendor_students(&self, token: &str) -> Result<Envelope<Vec<StudentRecord>>, ApiError> {
        self.get("/api/vendor/students", Some(token)).await
    }

    pub async fn get_vendor_courses(&self, token: &str) -> Result<Envelope<Vec<CourseRecord>>, ApiError> {
        self.get("/api/vendor/courses", Some(token)).await
    }

    pub async fn generate_vendor_referral_code<B: Serialize>(&self, payload: &B, token: &str) -> Result<Value, ApiError> {
        self.send(Method::POST, "/api/vendor/referral/generate", payload, Some(token)).await
    }

    // Mentor

    pub async fn get_mentor_dashboard<T: DeserializeOwned>(&self, token: &str) -> Result<Envelope<T>, ApiError> {
        self.get("/api/mentor/dashboard", Some(token)).await
    }

    pub async fn create_mentor_referral_code<B: Serialize>(
        &self,
        payload: &B,
        token: &str,
    ) -> Result<Envelope<IssuedCode>, ApiError> {
        self.send(Method::POST, "/api/mentor/create-referral-code", payload, Some(token)).await
    }

    pub async fn get_mentor_referral_codes(&self, token: &str) -> Result<Envelope<Vec<ReferralCodeRecord>>, ApiError> {
        self.get("/api/mentor/referral-codes", Some(token)).await
    }

    pub async fn get_mentor_students(&self, token: &str) -> Result<Envelope<Vec<StudentRecord>>, ApiError> {
        self.get("/api/mentor/students", Some(token)).await
    }

    pub async fn deactivate_referral_code(&self, id: &str, token: &str) -> Result<Value, ApiError> {
        self.http(
            Method::PUT,
            &format!("/api/mentor/referral-code/{}/deactivate", id),
            None,
            Some(token),
        )
        .await
    }

    pub async fn get_mentor_courses(&self, token: &str) -> Result<Envelope<Vec<CourseRecord>>, ApiError> {
        self.get("/api/mentor/courses", Some(token)).await
    }

    pub async fn get_mentor_enrollments(&self, token: &str) -> Result<Envelope<Vec<EnrollmentRecord>>, ApiError> {
        self.get("/api/mentor/enrollments", Some(token)).await
    }

    pub async fn get_recent_activities(&self, token: &str) -> Result<Envelope<Vec<Activity>>, ApiError> {
        self.get("/api/mentor/recent-activities", Some(token)).await
    }

    // Universal referral system

    pub async fn generate_universal_referral_code(&self, token: &str) -> Result<Value, ApiError> {
        self.http(Method::POST, "/api/referral/generate", None, Some(token)).await
    }

    pub async fn get_referral_stats(&self, token: &str) -> Result<Value, ApiError> {
        self.get("/api/referral/stats", Some(token)).await
    }

    pub async fn validate_referral_code(&self, code: &str) -> Result<Value, ApiError> {
        self.send(Method::POST, "/api/referral/validate", &json!({ "code": code }), None)
            .await
    }

    // Users

    pub async fn get_user_data(&self, role: Role, token: &str) -> Result<Value, ApiError> {
        self.get(&format!("/api/users/{}", role.as_str()), Some(token)).await
    }

    pub async fn get_subordinates(&self, token: &str) -> Result<Value, ApiError> {
        self.get("/api/users/subordinates", Some(token)).await
    }

    pub async fn update_user_status(&self, user_id: &str, status: &str, token: &str) -> Result<Value, ApiError> {
        self.send(
            Method::PUT,
            &format!("/api/users/{}/status", user_id),
            &json!({ "status": status }),
            Some(token),
        )
        .await
    }

    // Notifications

    pub async fn get_notifications(&self, token: &str) -> Result<Value, ApiError> {
        self.get("/api/notifications", Some(token)).await
    }

    pub async fn mark_notification_read(&self, id: &str, token: &str) -> Result<Value, ApiError> {
        self.http(Method::PUT, &format!("/api/notifications/{}/read", id), None, Some(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slash() {
        let api = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000");
    }

    #[test]
    fn garbage_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn bearer_header_only_with_token() {
        let anonymous = ApiClient::headers(None).unwrap();
        assert!(anonymous.get(AUTHORIZATION).is_none());
        assert_eq!(anonymous.get(CONTENT_TYPE).unwrap(), "application/json");

        let signed = ApiClient::headers(Some("abc")).unwrap();
        assert_eq!(signed.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn token_with_line_break_is_an_invalid_token() {
        assert!(matches!(ApiClient::headers(Some("abc\ndef")), Err(ApiError::InvalidToken)));
    }
}
