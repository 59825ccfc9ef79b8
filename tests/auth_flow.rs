use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use pg_hostel::{
    auth::Role,
    db::entities::user,
    routes::app,
    test_helpers::{bearer, sqlite_state, test_router},
};

async fn sqlite_app() -> Router {
    app(sqlite_state().await)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = serde_json::from_slice(&bytes).expect("body should be json");
    (status, json)
}

async fn login(app: &Router, email: &str, password: &str) -> (String, String) {
    let (status, json) = send(
        app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {json}");
    (
        json["data"]["accessToken"].as_str().expect("access").to_string(),
        json["data"]["refreshToken"].as_str().expect("refresh").to_string(),
    )
}

async fn refresh(app: &Router, access: &str, refresh: &str) -> (StatusCode, Value) {
    send(
        app,
        request(
            "POST",
            "/api/auth/refresh-token",
            None,
            Some(json!({ "accessToken": access, "refreshToken": refresh })),
        ),
    )
    .await
}

#[tokio::test]
async fn health_is_public() {
    let app = test_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let (status, json) = send(&app, request("GET", "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn me_without_token_is_rejected_with_envelope() {
    let app = test_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let (status, json) = send(&app, request("GET", "/api/users/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Missing/invalid Authorization header");
}

#[tokio::test]
async fn unknown_email_gets_generic_message() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = test_router(db);

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "password123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid email or password");
}

#[tokio::test]
async fn malformed_body_is_wrapped_in_envelope() {
    let app = test_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let (status, json) = send(
        &app,
        request("POST", "/api/auth/login", None, Some(json!({ "email": 5 }))),
    )
    .await;
    assert!(status.is_client_error());
    assert_eq!(json["success"], false);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn tenant_token_cannot_list_users() {
    let app = test_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let token = bearer(Uuid::new_v4(), Role::Tenant);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("authorization", token)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_refresh_reuse_and_me() {
    let app = sqlite_app().await;
    let (access, refresh_token) = login(&app, "admin@example.com", "adminpassword").await;

    let (status, json) = refresh(&app, &access, &refresh_token).await;
    assert_eq!(status, StatusCode::OK, "refresh failed: {json}");
    let new_access = json["data"]["accessToken"].as_str().expect("access").to_string();
    let new_refresh = json["data"]["refreshToken"].as_str().expect("refresh").to_string();
    assert_ne!(new_refresh, refresh_token);

    let (status, json) = refresh(&app, &access, &refresh_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid refresh token");

    let (status, json) = send(&app, request("GET", "/api/users/me", Some(&new_access), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["email"], "admin@example.com");
    assert_eq!(json["data"]["role"], "SuperAdmin");
    assert!(json["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn second_login_revokes_first_refresh_token() {
    let app = sqlite_app().await;
    let (_, first_refresh) = login(&app, "admin@example.com", "adminpassword").await;
    let (access, second_refresh) = login(&app, "admin@example.com", "adminpassword").await;

    let (status, _) = refresh(&app, &access, &first_refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = refresh(&app, &access, &second_refresh).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_refresh_token_and_is_idempotent() {
    let app = sqlite_app().await;
    let (access, refresh_token) = login(&app, "admin@example.com", "adminpassword").await;
    let logout = || {
        request(
            "POST",
            "/api/auth/logout",
            Some(&access),
            Some(json!({ "refreshToken": refresh_token })),
        )
    };

    let (status, _) = send(&app, logout()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, logout()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = refresh(&app, &access, &refresh_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_always_creates_tenant() {
    let app = sqlite_app().await;

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "Resident@Example.com", "password": "password123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {json}");
    let access = json["data"]["accessToken"].as_str().expect("access").to_string();

    let (_, me) = send(&app, request("GET", "/api/users/me", Some(&access), None)).await;
    assert_eq!(me["data"]["role"], "Tenant");
    assert_eq!(me["data"]["email"], "resident@example.com");

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "resident@example.com", "password": "password123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "User with this email already exists");
}

#[tokio::test]
async fn pg_lifecycle_from_super_admin_to_tenant_complaint() {
    let app = sqlite_app().await;
    let (root, _) = login(&app, "admin@example.com", "adminpassword").await;

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/users",
            Some(&root),
            Some(json!({ "email": "owner@example.com", "password": "owner-pass", "role": 2 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create pg admin failed: {json}");
    let owner_id = json["data"]["id"].as_str().expect("id").to_string();

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/users",
            Some(&root),
            Some(json!({ "email": "staff@example.com", "password": "staff-pass", "role": "Staff" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (owner, _) = login(&app, "owner@example.com", "owner-pass").await;
    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/pg",
            Some(&owner),
            Some(json!({ "name": "Sunrise PG", "address": "12 Lake Road" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create pg failed: {json}");
    let pg_id = json["data"]["id"].as_str().expect("pg id").to_string();

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/users",
            Some(&owner),
            Some(json!({ "email": "tenant@example.com", "password": "tenant-pass", "role": "Tenant" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create tenant failed: {json}");
    assert_eq!(json["data"]["pgId"], pg_id.as_str());

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/rooms",
            Some(&owner),
            Some(json!({ "pgId": pg_id, "roomNumber": "101", "capacity": 2, "amenities": ["wifi"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create room failed: {json}");

    let (tenant, _) = login(&app, "tenant@example.com", "tenant-pass").await;
    let (status, json) = send(
        &app,
        request("GET", &format!("/api/rooms/{pg_id}"), Some(&tenant), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["availableBeds"], 2);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/complaints",
            Some(&tenant),
            Some(json!({ "title": "Leaking tap", "description": "Bathroom tap leaks" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(&app, request("GET", "/api/complaints", Some(&owner), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["data"][0]["pgId"], pg_id.as_str());

    let (status, json) = send(&app, request("GET", "/api/users/me", Some(&root), None)).await;
    assert_eq!(status, StatusCode::OK);
    let root_id = json["data"]["id"].as_str().expect("id").to_string();

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/users/{root_id}"), Some(&root), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/users/{owner_id}"), Some(&root), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "owner-pass" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid email or password");
}

#[tokio::test]
async fn deactivated_user_cannot_login() {
    let app = sqlite_app().await;
    let (root, _) = login(&app, "admin@example.com", "adminpassword").await;

    let (_, json) = send(
        &app,
        request(
            "POST",
            "/api/users",
            Some(&root),
            Some(json!({ "email": "owner@example.com", "password": "owner-pass", "role": "PGAdmin" })),
        ),
    )
    .await;
    let owner_id = json["data"]["id"].as_str().expect("id").to_string();
    let (owner_access, owner_refresh) = login(&app, "owner@example.com", "owner-pass").await;

    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/users/{owner_id}"),
            Some(&root),
            Some(json!({ "isActive": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@example.com", "password": "owner-pass" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "User account is inactive");

    let (status, json) = refresh(&app, &owner_access, &owner_refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "User account is inactive");
}

#[tokio::test]
async fn deleted_user_email_stays_reserved() {
    let app = sqlite_app().await;
    let (root, _) = login(&app, "admin@example.com", "adminpassword").await;
    let create_owner = || {
        request(
            "POST",
            "/api/users",
            Some(&root),
            Some(json!({ "email": "owner@example.com", "password": "owner-pass", "role": 2 })),
        )
    };

    let (status, json) = send(&app, create_owner()).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    let owner_id = json["data"]["id"].as_str().expect("id").to_string();

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/users/{owner_id}"), Some(&root), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, create_owner()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "User with this email already exists");

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "OWNER@example.com", "password": "password123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "User with this email already exists");
}

#[tokio::test]
async fn rooms_are_listed_and_fetched_by_id() {
    let app = sqlite_app().await;
    let (root, _) = login(&app, "admin@example.com", "adminpassword").await;

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/pg",
            Some(&root),
            Some(json!({ "name": "Hillside PG", "address": "4 Ridge Street" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create pg failed: {json}");
    let pg_id = json["data"]["id"].as_str().expect("pg id").to_string();

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/api/rooms",
            Some(&root),
            Some(json!({ "pgId": pg_id, "roomNumber": "G1", "capacity": 3 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create room failed: {json}");
    let room_id = json["data"]["id"].as_str().expect("room id").to_string();

    let (status, json) = send(&app, request("GET", "/api/rooms", Some(&root), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().map(Vec::len), Some(1));

    let (status, json) = send(
        &app,
        request("GET", &format!("/api/rooms/item/{room_id}"), Some(&root), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["roomNumber"], "G1");
    assert_eq!(json["data"]["availableBeds"], 3);

    let (status, json) = send(
        &app,
        request(
            "GET",
            &format!("/api/rooms/item/{}", Uuid::new_v4()),
            Some(&root),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Room not found");

    let (status, _) = send(&app, request("GET", "/api/rooms", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
