use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{auth, complaints, pg, public, roles, rooms, users};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router())
        .merge(auth::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(pg::router(state.clone()))
        .merge(rooms::router(state.clone()))
        .merge(complaints::router(state.clone()))
        .merge(roles::router(state))
}
