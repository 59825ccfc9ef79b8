use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use super::views::{RoleView, collect};
use crate::{
    auth::policy::RoleCapabilities,
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/roles", get(list))
        .route("/roles/capabilities", get(capabilities))
        .route("/roles/{id}", get(show))
        .with_state(state)
}

async fn list(State(state): State<Arc<AppState>>, _claims: AuthGuard) -> ApiResult<Vec<RoleView>> {
    let roles = state.services().role().list().await?;
    JsonApiResponse::ok(collect(roles))
}

async fn show(
    State(state): State<Arc<AppState>>,
    _claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<RoleView> {
    let role = state.services().role().get(id).await?;
    JsonApiResponse::ok(role.into())
}

async fn capabilities(
    State(state): State<Arc<AppState>>,
    _claims: AuthGuard,
) -> ApiResult<Vec<RoleCapabilities>> {
    JsonApiResponse::ok(state.services().role().capabilities())
}
