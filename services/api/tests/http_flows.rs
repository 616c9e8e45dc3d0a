//! End-to-end request flows against the router with in-memory stores.

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use civic_api::{
    issues::IssueService, middleware::CookieSettings, repositories::InMemoryIssueRepository,
    routes::create_router, state::AppState, upload::UploadStore,
};
use civic_auth::{
    AuthService, InMemorySessionStore, SessionManager, VerificationCodes,
    repositories::InMemoryUserRepository, session::DEFAULT_SESSION_TTL,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("civic-http-{}", Uuid::new_v4()))
}

fn app_with_uploads(dir: PathBuf) -> Router {
    let sessions = SessionManager::new(
        Arc::new(InMemorySessionStore::new()),
        "test-session-secret",
        DEFAULT_SESSION_TTL,
    );
    let state = AppState {
        auth: AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            sessions,
            VerificationCodes::default(),
        ),
        issues: IssueService::new(Arc::new(InMemoryIssueRepository::new())),
        uploads: UploadStore::new(dir),
        cookies: CookieSettings {
            secure: false,
            max_age: DEFAULT_SESSION_TTL,
        },
    };
    create_router(state)
}

fn app() -> Router {
    app_with_uploads(upload_dir())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn citizen() -> Value {
    json!({
        "firstname": "A",
        "lastname": "B",
        "username": "ab1",
        "email": "ab1@x.com",
        "phone": "9876543210",
        "password": "secret1",
        "gender": "Male",
        "DOB": "2000-01-01"
    })
}

fn report(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "details": "Big one",
        "category": category,
        "reporter": {"username": "ab1", "email": "ab1@x.com", "phone": "9876543210"}
    })
}

fn is_issue_id(value: &Value) -> bool {
    value.as_str().is_some_and(|id| {
        id.len() == 10
            && id.starts_with("CIV-")
            && id[4..].chars().all(|c| c.is_ascii_digit())
    })
}

#[tokio::test]
async fn report_lifecycle_from_registration_to_resolution() {
    let app = app();

    let (status, body) = send(&app, json_request("POST", "/api/auth/register", citizen())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/report", report("Pothole", "Roads")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(is_issue_id(&body["issue"]["issueId"]));
    let issue_id = body["issue"]["issueId"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get(&format!("/api/report/{}", issue_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue"]["status"], "New");
    assert_eq!(body["issue"]["title"], "Pothole");

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/report/{}", issue_id),
            json!({"status": "Resolved"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue"]["status"], "Resolved");
    assert_eq!(body["issue"]["category"], "Roads");
}

#[tokio::test]
async fn report_without_reporter_is_rejected() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/report",
            json!({"title": "Pothole", "details": "Big one", "category": "Roads"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn patch_rejects_fields_outside_the_allow_list() {
    let app = app();
    let (_, body) = send(
        &app,
        json_request("POST", "/api/report", report("Pothole", "Roads")),
    )
    .await;
    let issue_id = body["issue"]["issueId"].as_str().unwrap().to_string();
    let uri = format!("/api/report/{}", issue_id);

    let (status, _) = send(
        &app,
        json_request("PATCH", &uri, json!({"category": "Electricity"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, json_request("PATCH", &uri, json!({"rating": 9}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, json_request("PATCH", &uri, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get(&uri)).await;
    assert_eq!(body["issue"]["category"], "Roads");
    assert!(body["issue"]["rating"].is_null());
}

#[tokio::test]
async fn unknown_issue_is_not_found() {
    let app = app();

    let (status, body) = send(&app, get("/api/report/CIV-999999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Issue not found");

    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/report/CIV-999999", json!({"assigned": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_filters_and_orders_newest_first() {
    let app = app();
    for (title, category) in [
        ("first", "Roads"),
        ("outage", "Electricity"),
        ("second", "Roads"),
    ] {
        let (status, _) = send(&app, json_request("POST", "/api/report", report(title, category))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/api/report?category=Roads")).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["second", "first"]);

    let (_, body) = send(&app, get("/api/report")).await;
    assert_eq!(body["issues"].as_array().unwrap().len(), 3);

    let (_, body) = send(&app, get("/api/report/count?status=New&category=Roads")).await;
    assert_eq!(body["count"], 2);

    let (status, _) = send(&app, get("/api/report?status=Closed")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_sets_cookie_used_by_me_until_logout() {
    let app = app();
    send(&app, json_request("POST", "/api/auth/register", citizen())).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"usernameOrEmail": "ab1", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("civic.sid="));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let me = |cookie: Option<&str>| {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    };

    let (status, body) = send(&app, me(Some(cookie.as_str()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "ab1");
    assert_eq!(body["user"]["role"], "user");

    let logout = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, logout).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out");

    let (status, body) = send(&app, me(Some(cookie.as_str()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authenticated");

    let (status, _) = send(&app, me(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_credentials_and_duplicates_map_to_statuses() {
    let app = app();
    send(&app, json_request("POST", "/api/auth/register", citizen())).await;

    let (status, body) = send(&app, json_request("POST", "/api/auth/register", citizen())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already in use");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"usernameOrEmail": "ab1", "password": "wrong-one"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let mut admin = citizen();
    admin["role"] = json!("admin");
    admin["verificationCode"] = json!("nope");
    let (status, _) = send(&app, json_request("POST", "/api/auth/register", admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn uploaded_photo_is_stored_and_served() {
    let dir = upload_dir();
    let app = app_with_uploads(dir.clone());

    let boundary = "civic-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"road.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\njpeg bytes\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload/photo")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with("-road.jpg"));

    let response = app.clone().oneshot(get(&url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"jpeg bytes");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn upload_without_photo_field_is_rejected() {
    let app = app();

    let boundary = "civic-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload/photo")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn root_and_health_respond() {
    let app = app();

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"API is running!");

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn mistyped_report_bodies_are_rejected_with_json_message() {
    let app = app();

    let mut numeric_title = report("Pothole", "Roads");
    numeric_title["title"] = json!(5);
    let mut half_location = report("Pothole", "Roads");
    half_location["location"] = json!({"lat": 12.97});

    for body in [numeric_title, half_location] {
        let (status, body) = send(&app, json_request("POST", "/api/report", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    let (status, body) = send(&app, get("/api/report")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issues"], json!([]));
}

#[tokio::test]
async fn body_without_content_type_is_rejected_with_json_message() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .body(Body::from(citizen().to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/api/report")
        .body(Body::from(report("Pothole", "Roads").to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn malformed_auth_bodies_are_rejected_with_json_message() {
    let app = app();

    let mut numeric_phone = citizen();
    numeric_phone["phone"] = json!(9876543210u64);
    let (status, body) = send(&app, json_request("POST", "/api/auth/register", numeric_phone)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let empty_login = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, empty_login).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
