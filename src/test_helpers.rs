//! Fixtures shared by unit tests and the `tests/` integration suites.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, FixedOffset, TimeZone};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    auth::{
        Role,
        bootstrap::{build_providers, init_providers},
        jwt::{JwtKeys, encode_token, make_access_claims},
        providers::AuthProviderId,
    },
    config::{AppConfig, AuthConfig, DatabaseConfig},
    db::{
        connection,
        entities::{complaint, pg, refresh_token, room, user},
    },
    routes::app,
    services::ServiceContext,
    state::AppState,
};

pub const TEST_SECRET: &str = "test-secret-test-secret-test-secret";

pub fn ts() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("offset should be valid")
        .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("timestamp should be valid")
}

pub fn user_model(id: Uuid, email: &str, role: Role, pg_id: Option<Uuid>) -> user::Model {
    user::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        is_deleted: false,
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role: role.value(),
        is_active: true,
        pg_id,
        last_login_at: None,
    }
}

pub fn refresh_token_model(
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<FixedOffset>,
    revoked: bool,
) -> refresh_token::Model {
    refresh_token::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        is_deleted: false,
        user_id,
        token_hash: token_hash.to_string(),
        expires_at,
        revoked,
        revoked_at: None,
    }
}

pub fn pg_model(id: Uuid, owner_id: Uuid) -> pg::Model {
    pg::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        is_deleted: false,
        name: "Sunrise PG".to_string(),
        address: "12 Lake Road".to_string(),
        owner_id,
    }
}

pub fn room_model(id: Uuid, pg_id: Uuid, room_number: &str) -> room::Model {
    room::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        is_deleted: false,
        pg_id,
        room_number: room_number.to_string(),
        capacity: 3,
        occupied_beds: 0,
        is_available: true,
        room_type: Some("Triple".to_string()),
        price: Some(7500.0),
        floor_number: Some(1),
        description: None,
        amenities: serde_json::json!(["wifi"]),
        images: serde_json::json!([]),
    }
}

pub fn complaint_model(id: Uuid, tenant_id: Uuid, pg_id: Option<Uuid>) -> complaint::Model {
    complaint::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        is_deleted: false,
        tenant_id,
        pg_id,
        title: "Leaking tap".to_string(),
        description: "Bathroom tap leaks at night".to_string(),
        status: "Pending".to_string(),
        assigned_to: None,
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        provider: AuthProviderId::Local,
        jwt_secret: TEST_SECRET.to_string(),
        admin_email: "admin@example.com".to_string(),
        admin_password: "adminpassword".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_days: 7,
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        auth: Some(test_auth_config()),
        ..Default::default()
    }
}

pub fn test_state(db: DatabaseConnection) -> Arc<AppState> {
    let cfg = test_config();
    let services = ServiceContext::new(&db);
    let providers = build_providers(
        cfg.auth.as_ref().expect("auth config should be present"),
        &services,
    )
    .expect("create auth providers");
    AppState::new(cfg, db, providers)
}

pub fn test_router(db: DatabaseConnection) -> Router {
    app(test_state(db))
}

/// State over a fresh in-memory SQLite database with roles and the
/// SuperAdmin from [`test_auth_config`] seeded.
pub async fn sqlite_state() -> Arc<AppState> {
    let db = connection::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_idle: 1,
    })
    .await
    .expect("sqlite should connect");
    let services = ServiceContext::new(&db);
    let providers = init_providers(&test_auth_config(), &services)
        .await
        .expect("providers should initialise");
    AppState::new(test_config(), db, providers)
}

/// Correctly signed access token whose `exp` is already in the past.
pub fn expired_access_token(user_id: Uuid, role: Role) -> String {
    let mut claims = make_access_claims(&user_id, role, 0);
    claims.iat = claims.iat.saturating_sub(3600);
    claims.exp = claims.iat + 60;
    encode_token(&JwtKeys::from_secret(TEST_SECRET.as_bytes()), &claims)
        .expect("token should encode")
}

pub fn bearer(user_id: Uuid, role: Role) -> String {
    let claims = make_access_claims(&user_id, role, 300);
    let token = encode_token(&JwtKeys::from_secret(TEST_SECRET.as_bytes()), &claims)
        .expect("token should encode");
    format!("Bearer {token}")
}
