use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    auth::TokenBundle,
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<TokenResponse> {
    let tokens = state.auth().register(&body.email, &body.password).await?;
    JsonApiResponse::created("Registration successful", tokens.into())
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let tokens = state.auth().login(&body.email, &body.password).await?;
    JsonApiResponse::with_message("Login successful", tokens.into())
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<TokenResponse> {
    let tokens = state.auth().refresh(&body.access_token, &body.refresh_token).await?;
    JsonApiResponse::with_message("Token refreshed successfully", tokens.into())
}

async fn logout(
    State(state): State<Arc<AppState>>,
    _claims: AuthGuard,
    Json(body): Json<LogoutRequest>,
) -> ApiResult<()> {
    state.auth().logout(&body.refresh_token).await?;
    JsonApiResponse::with_message("Logged out successfully", ())
}

impl From<TokenBundle> for TokenResponse {
    fn from(bundle: TokenBundle) -> Self {
        Self {
            access_token: bundle.access_token,
            refresh_token: bundle.refresh_token,
            expires_at: bundle.expires_at,
        }
    }
}
