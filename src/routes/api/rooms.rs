use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use super::views::{RoomView, collect};
use crate::{
    auth::{Admins, Operators},
    middleware::{AuthGuard, AuthRoleGuard},
    response::{ApiResult, JsonApiResponse},
    services::room_service::{CreateRoomRequest, UpdateRoomRequest},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rooms", get(list_all).post(create))
        .route("/rooms/{pg_id}", get(list_for_pg))
        .route("/rooms/item/{id}", get(show).put(update).delete(remove))
        .with_state(state)
}

async fn list_all(
    State(state): State<Arc<AppState>>,
    _claims: AuthGuard,
) -> ApiResult<Vec<RoomView>> {
    let rooms = state.services().room().list_all().await?;
    JsonApiResponse::ok(collect(rooms))
}

async fn show(
    State(state): State<Arc<AppState>>,
    _claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<RoomView> {
    let room = state.services().room().get(id).await?;
    JsonApiResponse::ok(room.into())
}

async fn list_for_pg(
    State(state): State<Arc<AppState>>,
    _claims: AuthGuard,
    Path(pg_id): Path<Uuid>,
) -> ApiResult<Vec<RoomView>> {
    let rooms = state.services().room().list_for_pg(pg_id).await?;
    JsonApiResponse::ok(collect(rooms))
}

async fn create(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Operators>,
    Json(body): Json<CreateRoomRequest>,
) -> ApiResult<RoomView> {
    let room = state.services().room().create(&actor, body).await?;
    JsonApiResponse::created("Room created successfully", room.into())
}

async fn update(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Operators>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRoomRequest>,
) -> ApiResult<RoomView> {
    let room = state.services().room().update(&actor, id, body).await?;
    JsonApiResponse::with_message("Room updated successfully", room.into())
}

async fn remove(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Admins>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services().room().delete(&actor, id).await?;
    JsonApiResponse::with_message("Room deleted successfully", ())
}
