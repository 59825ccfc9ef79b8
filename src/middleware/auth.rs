use std::{marker::PhantomData, sync::Arc};

use axum::{extract::FromRequestParts, http::header};

use crate::{
    auth::{AllowedRoles, Claims, policy::Actor},
    error::AppError,
    state::AppState,
};

// Validates the bearer token through the active auth provider.
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(claims);
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("Missing/invalid Authorization header"))?;

        let claims = state.auth().verify(token).await?;

        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

pub type AuthGuard = Claims;

/// Verified caller with their PG loaded from the users table.
pub struct CurrentActor(pub Actor);

impl FromRequestParts<Arc<AppState>> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>().copied() {
            return Ok(Self(actor));
        }
        let claims = Claims::from_request_parts(parts, state).await?;
        let actor = state.services().user().resolve_actor(&claims).await?;
        parts.extensions.insert(actor);
        Ok(Self(actor))
    }
}

/// Rejects callers whose token role is outside `R` before touching the
/// database, then resolves the actor.
pub struct AuthRoleGuard<R: AllowedRoles> {
    pub actor: Actor,
    _marker: PhantomData<R>,
}

impl<R> FromRequestParts<Arc<AppState>> for AuthRoleGuard<R>
where
    R: AllowedRoles,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;
        if !R::allowed().contains(&claims.role) {
            return Err(AppError::unauthorized(
                "You do not have permission to perform this action",
            ));
        }

        let CurrentActor(actor) = CurrentActor::from_request_parts(parts, state).await?;
        Ok(Self {
            actor,
            _marker: PhantomData,
        })
    }
}
