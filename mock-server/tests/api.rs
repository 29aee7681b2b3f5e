use axum::{
    http::{self, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mock_server::app;
use mock_server::model::{ADMIN_EMAIL, HR_EMAIL, STUDENT_EMAIL};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .unwrap(),
        None => builder.body(String::new()).unwrap(),
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    app.clone()
        .oneshot(request(method, uri, token, body))
        .await
        .unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let resp = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    body["token"].as_str().unwrap().to_string()
}

// --- auth ---

#[tokio::test]
async fn login_returns_token_and_user() {
    let app = app();
    let resp = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": STUDENT_EMAIL, "password": "student123" })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["userType"], "STUDENT");
    assert_eq!(body["user"]["email"], STUDENT_EMAIL);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let app = app();
    let resp = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "nope" })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body, json!({ "success": false, "message": "Invalid email or password" }));
}

#[tokio::test]
async fn missing_token_is_401() {
    let app = app();
    let resp = send(&app, "GET", "/api/users", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn unknown_token_is_401() {
    let app = app();
    let resp = send(&app, "GET", "/api/auth/verify", Some("forged"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_role_is_403() {
    let app = app();
    let token = login(&app, STUDENT_EMAIL, "student123").await;
    let resp = send(&app, "GET", "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["message"], "Access denied");
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = app();
    let token = login(&app, HR_EMAIL, "hr123").await;

    let resp = send(&app, "GET", "/api/auth/verify", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["valid"], true);

    let resp = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, "GET", "/api/auth/verify", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_creates_student_and_rejects_duplicates() {
    let app = app();
    let input = json!({
        "firstName": "Meera",
        "email": "meera@example.com",
        "password": "pw",
        "mobileNo": "9000000000"
    });
    let resp = send(&app, "POST", "/api/auth/register", None, Some(input.clone())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["user"]["userType"], "STUDENT");

    let resp = send(&app, "POST", "/api/auth/register", None, Some(input)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// --- admin ---

#[tokio::test]
async fn dashboard_stats_are_unwrapped() {
    let app = app();
    let token = login(&app, ADMIN_EMAIL, "admin123").await;
    let resp = send(&app, "GET", "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["totalStudents"], 1);
    assert_eq!(body["totalFacultyHR"], 2);
    assert_eq!(body["publishedPosts"], 1);
}

#[tokio::test]
async fn user_lifecycle() {
    let app = app();
    let token = login(&app, ADMIN_EMAIL, "admin123").await;

    let resp = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "firstName": "Kiran",
            "email": "kiran@example.com",
            "password": "pw",
            "mobileNo": "9111111111",
            "userType": "HR"
        })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["data"]["id"].as_u64().unwrap();

    let resp = send(&app, "GET", "/api/users?role=HR", Some(&token), None).await;
    assert_eq!(body_json(resp).await["total"], 2);

    let resp = send(
        &app,
        "PATCH",
        &format!("/api/users/{id}/toggle-status"),
        Some(&token),
        Some(json!({ "isEnabled": false })),
    )
    .await;
    assert_eq!(body_json(resp).await["data"]["status"], "Inactive");

    let resp = send(&app, "DELETE", &format!("/api/users/{id}"), Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, "GET", &format!("/api/users/{id}"), Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "User not found");
}

#[tokio::test]
async fn disabling_a_user_revokes_their_session() {
    let app = app();
    let admin = login(&app, ADMIN_EMAIL, "admin123").await;
    let hr = login(&app, HR_EMAIL, "hr123").await;

    let resp = send(&app, "GET", "/api/users?role=HR", Some(&admin), None).await;
    let hr_id = body_json(resp).await["data"][0]["id"].as_u64().unwrap();

    send(
        &app,
        "PATCH",
        &format!("/api/users/{hr_id}/toggle-status"),
        Some(&admin),
        Some(json!({ "isEnabled": false })),
    )
    .await;

    let resp = send(&app, "GET", "/api/hr/applications", Some(&hr), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn export_is_csv() {
    let app = app();
    let token = login(&app, ADMIN_EMAIL, "admin123").await;
    let resp = send(&app, "GET", "/api/registrations/export", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "text/csv");
    let csv = body_bytes(resp).await;
    let text = std::str::from_utf8(&csv).unwrap();
    assert!(text.starts_with("id,name,email,mobileNo\n"));
    assert!(text.contains(STUDENT_EMAIL));
}

#[tokio::test]
async fn delete_multiple_registrations() {
    let app = app();
    let token = login(&app, ADMIN_EMAIL, "admin123").await;
    let resp = send(&app, "GET", "/api/registrations", Some(&token), None).await;
    let id = body_json(resp).await["data"][0]["id"].as_u64().unwrap();

    let resp = send(
        &app,
        "POST",
        "/api/registrations/delete-multiple",
        Some(&token),
        Some(json!({ "ids": [id, 9999] })),
    )
    .await;
    assert_eq!(
        body_json(resp).await["message"],
        "1 registration(s) deleted successfully"
    );

    let resp = send(&app, "GET", "/api/registrations", Some(&token), None).await;
    assert_eq!(body_json(resp).await["total"], 0);
}

#[tokio::test]
async fn internship_filters_and_search() {
    let app = app();
    let token = login(&app, ADMIN_EMAIL, "admin123").await;

    let resp = send(&app, "GET", "/api/internships?status=Posted", Some(&token), None).await;
    let body = body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["code"], "WEB-01");

    let resp = send(&app, "GET", "/api/internships/search?term=data", Some(&token), None).await;
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["code"], "DS-01");
}

// --- hr + student ---

#[tokio::test]
async fn application_flow_notifies_student() {
    let app = app();
    let student = login(&app, STUDENT_EMAIL, "student123").await;
    let hr = login(&app, HR_EMAIL, "hr123").await;

    let resp = send(&app, "GET", "/api/student/internships", Some(&student), None).await;
    let post_id = body_json(resp).await["data"][0]["id"].as_u64().unwrap();

    let resp = send(
        &app,
        "POST",
        "/api/student/applications",
        Some(&student),
        Some(json!({ "careerPostId": post_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let app_id = body_json(resp).await["data"]["id"].as_u64().unwrap();

    let resp = send(
        &app,
        "POST",
        "/api/student/applications",
        Some(&student),
        Some(json!({ "careerPostId": post_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["success"], false);

    let resp = send(
        &app,
        "PUT",
        &format!("/api/hr/applications/{app_id}/status"),
        Some(&hr),
        Some(json!({ "status": "Shortlisted", "hrNotes": "good fit" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "Shortlisted");
    assert_eq!(body["data"]["hrNotes"], "good fit");

    let resp = send(&app, "GET", "/api/hr/applications/shortlisted", Some(&hr), None).await;
    assert_eq!(body_json(resp).await["total"], 1);

    let resp = send(
        &app,
        "GET",
        "/api/student/notifications?unreadOnly=true",
        Some(&student),
        None,
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["notificationType"], "APPLICATION_STATUS");

    let resp = send(
        &app,
        "PATCH",
        "/api/student/notifications/read-all",
        Some(&student),
        None,
    )
    .await;
    assert_eq!(
        body_json(resp).await["message"],
        "2 notification(s) marked as read"
    );

    let resp = send(&app, "GET", "/api/student/dashboard/stats", Some(&student), None).await;
    let stats = body_json(resp).await;
    assert_eq!(stats["data"]["shortlistedApplications"], 1);
    assert_eq!(stats["data"]["unreadNotifications"], 0);
}

#[tokio::test]
async fn bulk_update_requires_ids() {
    let app = app();
    let hr = login(&app, HR_EMAIL, "hr123").await;
    let resp = send(
        &app,
        "PUT",
        "/api/hr/applications/bulk-update",
        Some(&hr),
        Some(json!({ "applicationIds": [], "status": "Rejected" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "No application IDs provided");
}

#[tokio::test]
async fn hr_dashboard_is_enveloped() {
    let app = app();
    let hr = login(&app, HR_EMAIL, "hr123").await;
    let resp = send(&app, "GET", "/api/hr/dashboard/stats", Some(&hr), None).await;
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["totalApplications"], 0);
    assert_eq!(body["data"]["byInternship"].as_array().unwrap().len(), 2);
}
