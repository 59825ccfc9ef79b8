use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use super::views::{UserView, collect};
use crate::{
    auth::{Admins, SuperAdminOnly},
    middleware::{AuthGuard, AuthRoleGuard},
    response::{ApiResult, JsonApiResponse},
    services::user_service::{CreateUserRequest, UpdateUserRequest},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users/me", get(me))
        .route("/users", get(list).post(create))
        .route("/users/{id}", get(show).put(update).delete(remove))
        .with_state(state)
}

async fn me(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<UserView> {
    let user = state.services().user().current(&claims).await?;
    JsonApiResponse::ok(user.into())
}

async fn list(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Admins>,
) -> ApiResult<Vec<UserView>> {
    let users = state.services().user().list(&actor).await?;
    JsonApiResponse::ok(collect(users))
}

async fn create(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Admins>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<UserView> {
    let user = state.services().user().create(&actor, body).await?;
    JsonApiResponse::created("User created successfully", user.into())
}

async fn show(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Admins>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserView> {
    let user = state.services().user().get(&actor, id).await?;
    JsonApiResponse::ok(user.into())
}

async fn update(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Admins>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<UserView> {
    let user = state.services().user().update(&actor, id, body).await?;
    JsonApiResponse::with_message("User updated successfully", user.into())
}

async fn remove(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<SuperAdminOnly>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services().user().delete(&actor, id).await?;
    JsonApiResponse::with_message("User deleted successfully", ())
}
