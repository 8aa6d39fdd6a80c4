use claim::{assert_err, assert_ok};
use sajre_client::{ApiClient, ApiError};
use serde_json::{json, Map};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn error_message_prefers_message_then_error_then_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "", "error": "Forbidden" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-otp"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();

    let err = api.login("a@b.com", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.status(), Some(401));

    let err = api.admin_login("a@b.com", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "Forbidden");

    let err = api.verify_otp("a@b.com", "123456").await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed: 500");
}

#[tokio::test]
async fn bearer_token_and_json_content_type_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/vendors"))
        .and(header("Authorization", "Bearer tok-123"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&format!("{}/", server.uri())).unwrap();
    let vendors = api.get_all_vendors("tok-123").await.unwrap();
    assert!(vendors.success);
    assert!(vendors.into_data().is_empty());
}

#[tokio::test]
async fn unparsable_success_body_reads_as_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let body = api.contact_us(&json!({ "name": "Asha" })).await.unwrap();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn course_and_enrollment_edits_use_put_and_delete() {
    let server = MockServer::start().await;
    for (verb, route) in [
        ("PUT", "/api/admin/course/c1"),
        ("DELETE", "/api/admin/course/c1"),
        ("PUT", "/api/admin/enrollment/e1"),
        ("DELETE", "/api/admin/enrollment/e1"),
    ] {
        Mock::given(method(verb))
            .and(path(route))
            .and(header("Authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut payload = Map::new();
    payload.insert("title".into(), json!("Rust 201"));
    assert_ok!(api.update_course("c1", &payload, "t").await);
    assert_ok!(api.delete_course("c1", "t").await);
    assert_ok!(api.update_enrollment("e1", &payload, "t").await);
    assert_ok!(api.delete_enrollment("e1", "t").await);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({ "title": "Rust 201" }));
}

#[tokio::test]
async fn transport_failure_is_not_an_http_error() {
    // nothing listens on the discard port
    let api = ApiClient::new("http://127.0.0.1:9").unwrap();
    let err = assert_err!(api.get_public_courses().await);
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}
