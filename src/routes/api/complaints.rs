use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use super::views::{ComplaintView, collect};
use crate::{
    auth::{Operators, Tenants},
    middleware::AuthRoleGuard,
    response::{ApiResult, JsonApiResponse},
    services::complaint_service::{CreateComplaintRequest, UpdateComplaintRequest},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/complaints", get(list).post(create))
        .route("/complaints/my", get(my))
        .route("/complaints/{id}", put(update))
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Tenants>,
    Json(body): Json<CreateComplaintRequest>,
) -> ApiResult<ComplaintView> {
    let complaint = state.services().complaint().create(&actor, body).await?;
    JsonApiResponse::created("Complaint submitted successfully", complaint.into())
}

async fn my(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Tenants>,
) -> ApiResult<Vec<ComplaintView>> {
    let complaints = state.services().complaint().my(&actor).await?;
    JsonApiResponse::ok(collect(complaints))
}

async fn list(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Operators>,
) -> ApiResult<Vec<ComplaintView>> {
    let complaints = state.services().complaint().list(&actor).await?;
    JsonApiResponse::ok(collect(complaints))
}

async fn update(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { actor, .. }: AuthRoleGuard<Operators>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateComplaintRequest>,
) -> ApiResult<ComplaintView> {
    let complaint = state.services().complaint().update(&actor, id, body).await?;
    JsonApiResponse::with_message("Complaint updated successfully", complaint.into())
}
