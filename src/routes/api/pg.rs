use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use super::views::{PgView, collect};
use crate::{
    auth::{Admins, SuperAdminOnly},
    middleware::{AuthGuard, AuthRoleGuard},
    response::{ApiResult, JsonApiResponse},
    services::pg_service::{CreatePgRequest, UpdatePgRequest},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/pg", get(list).post(create))
        .route("/pg/{id}", get(show).put(update).delete(remove))
        .with_state(state)
}

async fn list(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Admins>,
) -> ApiResult<Vec<PgView>> {
    let pgs = state.services().pg().list(&actor).await?;
    JsonApiResponse::ok(collect(pgs))
}

async fn create(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Admins>,
    Json(body): Json<CreatePgRequest>,
) -> ApiResult<PgView> {
    let pg = state.services().pg().create(&actor, body).await?;
    JsonApiResponse::created("PG created successfully", pg.into())
}

async fn show(
    State(state): State<Arc<AppState>>,
    _claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<PgView> {
    let pg = state.services().pg().get(id).await?;
    JsonApiResponse::ok(pg.into())
}

async fn update(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Admins>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePgRequest>,
) -> ApiResult<PgView> {
    let pg = state.services().pg().update(&actor, id, body).await?;
    JsonApiResponse::with_message("PG updated successfully", pg.into())
}

async fn remove(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<SuperAdminOnly>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services().pg().delete(&actor, id).await?;
    JsonApiResponse::with_message("PG deleted successfully", ())
}
