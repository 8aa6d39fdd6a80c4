use sajre_client::dashboard::admin::{delete, save, AdminDashboard, EntityKind};
use sajre_client::dashboard::mentor::MentorDashboard;
use sajre_client::dashboard::poller::StudentPoller;
use sajre_client::dashboard::student::{fallback_activities, ProfileEdit, StudentDashboard};
use sajre_client::dashboard::vendor::VendorDashboard;
use sajre_client::dashboard::DashboardError;
use sajre_client::models::SessionUser;
use sajre_client::storage::TOKEN_KEY;
use sajre_client::store::{NewUser, Profile, StoreOptions, StudentProfile};
use sajre_client::{AccessError, ApiClient, LocalStore, MemoryStorage, Route, Session, Storage};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_as(role: &str) -> (Arc<dyn Storage>, Session) {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let mut session = Session::restore(storage.clone()).unwrap();
    let user: SessionUser =
        serde_json::from_value(json!({ "_id": "u1", "name": "Asha", "email": "asha@x.io", "role": role })).unwrap();
    session.sign_in("tok".into(), user).unwrap();
    (storage, session)
}

async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn student(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "userId": { "_id": format!("user-{id}"), "name": name, "email": format!("{id}@x.io") },
        "isEnrolled": true
    })
}

#[tokio::test]
async fn wrong_role_is_denied_before_any_request() {
    let server = MockServer::start().await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (_, session) = session_as("vendor");

    let err = AdminDashboard::load(&api, &session).await.unwrap_err();
    assert_eq!(err.to_string(), "Access Denied: Admin role required");
    assert_eq!(err.redirect(), Some(Route::Login));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn signed_out_visitor_cannot_load_mentor_dashboard() {
    let server = MockServer::start().await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let session = Session::restore(storage).unwrap();

    let err = MentorDashboard::load(&api, &session).await.unwrap_err();
    assert!(matches!(err, DashboardError::Access(AccessError::NotSignedIn)));
}

#[tokio::test]
async fn admin_dashboard_loads_every_table() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/admin/vendors",
        json!({ "success": true, "data": [{ "_id": "v1", "companyName": "Acme" }] }),
    )
    .await;
    mount_get(&server, "/api/admin/mentors", json!({ "success": true, "data": [] })).await;
    mount_get(
        &server,
        "/api/admin/students",
        json!({ "success": true, "data": [student("s1", "Nia"), student("s2", "Omar")] }),
    )
    .await;
    mount_get(&server, "/api/admin/courses", json!({ "success": true, "data": [] })).await;
    mount_get(&server, "/api/admin/enrollments", json!({ "success": true })).await;
    mount_get(
        &server,
        "/api/admin/dashboard",
        json!({
            "success": true,
            "data": {
                "counts": { "totalVendors": 1, "totalMentors": 0, "totalStudents": 2, "totalCourses": 0 },
                "recentActivities": {
                    "vendors": [{ "_id": "v1", "companyName": "Acme", "createdAt": "2024-03-01T10:00:00Z" }],
                    "students": [{ "_id": "s1", "createdAt": "2024-03-02T09:30:00Z" }]
                }
            }
        }),
    )
    .await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (_, session) = session_as("admin");

    let dashboard = AdminDashboard::load(&api, &session).await.unwrap();
    assert_eq!(dashboard.vendors.len(), 1);
    assert_eq!(dashboard.students.len(), 2);
    assert!(dashboard.enrollments.is_empty());
    assert_eq!(
        dashboard.role_distribution(),
        [("Vendors", 1), ("Mentors", 0), ("Students", 2), ("Courses", 0)]
    );

    let feed = dashboard.activity_feed();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].title, "New Student");
    assert_eq!(feed[0].description, "Unknown joined");
    assert_eq!(feed[0].time, "02/03/2024, 09:30:00");
    assert_eq!(feed[1].description, "Acme joined");

    let matches = dashboard.search("omar");
    assert_eq!(matches.students.len(), 1);
    assert!(matches.vendors.is_empty());
}

#[tokio::test]
async fn one_failed_table_fails_the_admin_load() {
    let server = MockServer::start().await;
    for route in ["/api/admin/vendors", "/api/admin/mentors", "/api/admin/students", "/api/admin/courses"] {
        mount_get(&server, route, json!({ "success": true, "data": [] })).await;
    }
    mount_get(&server, "/api/admin/dashboard", json!({ "success": true, "data": {} })).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/enrollments"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "db down" })))
        .mount(&server)
        .await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (_, session) = session_as("admin");

    let err = AdminDashboard::load(&api, &session).await.unwrap_err();
    assert_eq!(err.to_string(), "db down");
}

#[tokio::test]
async fn admin_edits_and_deletes_go_to_the_entity_routes() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/course/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/vendor/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    let api = ApiClient::new(&server.uri()).unwrap();

    let item = json!({ "_id": "c1", "title": "Rust 101", "price": 4999 });
    let Value::Object(item) = item else { unreachable!() };
    save(&api, "tok", EntityKind::Course, item).await.unwrap();
    delete(&api, "tok", EntityKind::Vendor, "v1").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({ "title": "Rust 101", "price": 4999 }));
}

#[tokio::test]
async fn vendor_dashboard_reads_metrics() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/vendor/dashboard",
        json!({
            "success": true,
            "data": {
                "counts": { "totalMentors": 3, "totalStudents": 40, "enrolledStudents": 25 },
                "revenueData": [{ "month": "Jan", "revenue": 1000.0 }, { "month": "Feb", "revenue": 1500.5 }],
                "performanceMetrics": { "courseCompletion": 92.0, "studentSatisfaction": 90.0 }
            }
        }),
    )
    .await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (_, mut session) = session_as("vendor");

    let dashboard = VendorDashboard::load(&api, &mut session).await.unwrap();
    assert_eq!(dashboard.total_revenue(), 2500.5);
    let [completion, satisfaction, ..] = dashboard.performance();
    assert!(completion.on_target());
    assert!(!satisfaction.on_target());
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn vendor_load_failure_ends_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/vendor/dashboard"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })))
        .mount(&server)
        .await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (storage, mut session) = session_as("vendor");

    let err = VendorDashboard::load(&api, &mut session).await.unwrap_err();
    assert_eq!(err.redirect(), Some(Route::Login));
    assert!(!session.is_signed_in());
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn vendor_rejection_without_message_uses_fallback() {
    let server = MockServer::start().await;
    mount_get(&server, "/api/vendor/dashboard", json!({ "success": false })).await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (_, mut session) = session_as("vendor");

    let err = VendorDashboard::load(&api, &mut session).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load dashboard data");
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn mentor_dashboard_prefers_the_students_endpoint() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/mentor/dashboard",
        json!({
            "success": true,
            "data": {
                "stats": { "totalStudents": 10, "enrolledStudents": 4 },
                "recentStudents": [student("s1", "Nia")]
            }
        }),
    )
    .await;
    mount_get(&server, "/api/mentor/courses", json!({ "success": true, "data": [] })).await;
    mount_get(&server, "/api/mentor/enrollments", json!({ "success": true, "data": [] })).await;
    mount_get(
        &server,
        "/api/mentor/recent-activities",
        json!({ "success": true, "data": [{ "type": "user", "title": "Joined", "description": "Nia joined", "time": "now" }] }),
    )
    .await;
    mount_get(
        &server,
        "/api/mentor/students",
        json!({ "success": true, "data": [student("s1", "Nia"), student("s2", "Omar")] }),
    )
    .await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (_, session) = session_as("mentor");

    let dashboard = MentorDashboard::load(&api, &session).await.unwrap();
    assert!(!dashboard.degraded);
    assert_eq!(dashboard.students.len(), 2);
    assert_eq!(dashboard.activities.len(), 1);
    assert_eq!(dashboard.referral_split(), [("Enrolled", 4), ("Registered", 6)]);
    assert_eq!(dashboard.search_students("OMAR").len(), 1);
}

#[tokio::test]
async fn unreachable_mentor_backend_degrades_to_placeholders() {
    let server = MockServer::start().await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (_, session) = session_as("mentor");

    let dashboard = MentorDashboard::load(&api, &session).await.unwrap();
    assert!(dashboard.degraded);
    assert_eq!(dashboard.activities.len(), 2);
    assert_eq!(dashboard.data.stats.total_students, 0);
    assert!(dashboard.students.is_empty());
}

#[tokio::test]
async fn poller_publishes_refreshed_students() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/mentor/students",
        json!({ "success": true, "data": [student("s1", "Nia"), student("s2", "Omar")] }),
    )
    .await;
    let api = ApiClient::new(&server.uri()).unwrap();

    let poller = StudentPoller::spawn(api, "tok".into(), Duration::from_millis(50), Vec::new());
    let mut updates = poller.subscribe();
    assert!(poller.latest().is_empty());

    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("poller never refreshed")
        .unwrap();
    assert_eq!(poller.latest().len(), 2);
    poller.stop();
}

#[tokio::test]
async fn failing_poller_slows_down_instead_of_hammering() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mentor/students"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let api = ApiClient::new(&server.uri()).unwrap();

    // 200ms cadence: polls at 200, 400 and 800ms, then waits until 1600ms.
    let poller = StudentPoller::spawn(api, "tok".into(), Duration::from_millis(200), Vec::new());
    tokio::time::sleep(Duration::from_millis(1100)).await;
    poller.stop();

    let sent = server.received_requests().await.unwrap().len();
    assert!((1..=3).contains(&sent), "sent {sent} requests");
}

const FAST_HASH: StoreOptions = StoreOptions { password_cost: 4 };

#[tokio::test]
async fn student_profile_comes_from_the_store_and_saves_back() {
    let server = MockServer::start().await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let session = Session::restore(storage.clone()).unwrap();
    let mut store = LocalStore::load(storage.clone(), FAST_HASH).unwrap();
    let id = store
        .add_user(NewUser::new("asha", "asha@x.io", "pw", Profile::Student(StudentProfile::default())))
        .unwrap()
        .id
        .clone();
    store.login("asha@x.io", "pw").unwrap();

    let mut board = StudentDashboard::load(&api, &session, &store).await.unwrap();
    assert_eq!(board.profile.store_id.as_deref(), Some(id.as_str()));
    assert_eq!(board.profile.username, "asha");
    assert_eq!(board.activities, fallback_activities());
    assert!(server.received_requests().await.unwrap().is_empty());

    let edit = ProfileEdit {
        username: "Asha K".into(),
        phone: "98765".into(),
        bio: "Learning Rust".into(),
    };
    assert!(board.save_profile(&mut store, edit).unwrap());
    assert!(board.set_photo(&mut store, "data:image/png;base64,AAAA".into()).unwrap());
    assert_eq!(board.profile.username, "Asha K");

    let reloaded = LocalStore::load(storage, FAST_HASH).unwrap();
    let saved = reloaded.get_by_id(&id).unwrap();
    assert_eq!(saved.username, "Asha K");
    assert_eq!(saved.phone.as_deref(), Some("98765"));
    assert_eq!(saved.bio.as_deref(), Some("Learning Rust"));
    assert_eq!(saved.photo.as_deref(), Some("data:image/png;base64,AAAA"));
}

#[tokio::test]
async fn session_only_student_profile_is_read_only() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/mentor/recent-activities",
        json!({ "success": true, "data": [{ "type": "course", "title": "Enrolled", "description": "Rust 101", "time": "now" }] }),
    )
    .await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let (storage, session) = session_as("user");
    let mut store = LocalStore::load(storage.clone(), FAST_HASH).unwrap();

    let mut board = StudentDashboard::load(&api, &session, &store).await.unwrap();
    assert_eq!(board.profile.store_id, None);
    assert_eq!(board.profile.username, "Asha");
    assert_eq!(board.activities.len(), 1);

    assert!(!board.save_profile(&mut store, ProfileEdit::default()).unwrap());
    assert!(!board.set_photo(&mut store, "data:".into()).unwrap());
    assert_eq!(storage.get_item(sajre_client::storage::ENTITIES_KEY).unwrap(), None);
}

#[tokio::test]
async fn nobody_signed_in_has_no_student_dashboard() {
    let server = MockServer::start().await;
    let api = ApiClient::new(&server.uri()).unwrap();
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let session = Session::restore(storage.clone()).unwrap();
    let store = LocalStore::load(storage, FAST_HASH).unwrap();

    assert!(StudentDashboard::load(&api, &session, &store).await.is_none());
}
