use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;

use super::validation::{FieldErrors, normalize_email};
use crate::{
    auth::{
        Claims, Role,
        password::hash_password,
        policy::{self, Actor, Capability},
    },
    db::dao::{DaoBase, DaoLayerError, NewUser, RefreshTokenDao, UserDao},
    db::entities::user,
    error::AppError,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub pg_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub pg_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

fn default_active() -> bool {
    true
}

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
    refresh_token_dao: RefreshTokenDao,
}

impl UserService {
    pub fn new(user_dao: UserDao, refresh_token_dao: RefreshTokenDao) -> Self {
        Self {
            user_dao,
            refresh_token_dao,
        }
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        match self.user_dao.find_by_id(*id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_email(&normalize_email(email)).await?)
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        Ok(self
            .user_dao
            .email_taken(&normalize_email(email), None)
            .await?)
    }

    /// Role comes from the token; the PG is read from the stored row.
    pub async fn resolve_actor(&self, claims: &Claims) -> Result<Actor, AppError> {
        let id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid token subject"))?;
        let user = self
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
        Actor::from_claims(claims, user.pg_id)
    }

    pub async fn current(&self, claims: &Claims) -> Result<user::Model, AppError> {
        let id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid token subject"))?;
        let user = self
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if !user.is_active {
            return Err(AppError::unauthorized("User account is inactive"));
        }
        Ok(user)
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<user::Model>, AppError> {
        policy::require(actor.role, Capability::ListUsers)?;
        let users = match (actor.role, actor.pg_id) {
            (Role::SuperAdmin, _) => self.user_dao.list_all().await?,
            (_, Some(pg_id)) => self.user_dao.list_for_pg(pg_id).await?,
            (_, None) => Vec::new(),
        };
        Ok(users)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<user::Model, AppError> {
        policy::require(actor.role, Capability::ListUsers)?;
        let user = self.user_dao.find_by_id(id).await?;
        if actor.is_super_admin() {
            return Ok(user);
        }
        if !actor.same_pg(user.pg_id) || user.role == Role::SuperAdmin.value() {
            return Err(AppError::unauthorized("You can only view users in your PG"));
        }
        Ok(user)
    }

    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
    ) -> Result<user::Model, AppError> {
        FieldErrors::new()
            .email(&request.email)
            .required("Password", &request.password)
            .finish()?;
        let pg_id = policy::check_create_user(actor, request.role, request.pg_id)?;

        let email = normalize_email(&request.email);
        if self.user_dao.email_taken(&email, None).await? {
            return Err(AppError::bad_request("User with this email already exists"));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .user_dao
            .create_user(NewUser {
                email,
                password_hash,
                role: request.role,
                is_active: request.is_active,
                pg_id,
            })
            .await?;
        tracing::info!(user_id = %user.id, role = request.role.as_str(), created_by = %actor.id, "user created");
        Ok(user)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<user::Model, AppError> {
        let target = self.user_dao.find_by_id(id).await?;
        policy::check_update_user(actor, target.pg_id, request.role, request.pg_id)?;

        let email = match request.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => {
                FieldErrors::new().email(email).finish()?;
                let email = normalize_email(email);
                if self.user_dao.email_taken(&email, Some(id)).await? {
                    return Err(AppError::bad_request("User with this email already exists"));
                }
                Some(email)
            }
            _ => None,
        };

        let updated = self
            .user_dao
            .update(id, move |active| {
                if let Some(email) = email {
                    active.email = Set(email);
                }
                if let Some(role) = request.role {
                    active.role = Set(role.value());
                }
                if let Some(pg_id) = request.pg_id {
                    active.pg_id = Set(Some(pg_id));
                }
                if let Some(is_active) = request.is_active {
                    active.is_active = Set(is_active);
                }
            })
            .await?;
        Ok(updated)
    }

    /// Soft-deletes the user and revokes every refresh token they hold.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        let target = self.user_dao.find_by_id(id).await?;
        let target_role = target
            .role()
            .ok_or_else(|| AppError::internal("User has an unknown role"))?;
        policy::check_delete_user(actor, target_role)?;

        self.user_dao.delete(id).await?;
        let revoked = self
            .refresh_token_dao
            .revoke_all_for_user(self.refresh_token_dao.db(), id)
            .await?;
        tracing::info!(user_id = %id, revoked, deleted_by = %actor.id, "user deleted");
        Ok(())
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<user::Model, AppError> {
        Ok(self.user_dao.create_user(new_user).await?)
    }

    pub async fn find_any_with_role(&self, role: Role) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_any_with_role(role).await?)
    }

    pub async fn set_last_login(
        &self,
        user_id: &Uuid,
        last_login: &chrono::DateTime<chrono::FixedOffset>,
    ) -> Result<(), AppError> {
        Ok(self.user_dao.set_last_login(user_id, last_login).await?)
    }

    pub async fn attach_to_pg(&self, user_id: &Uuid, pg_id: Uuid) -> Result<(), AppError> {
        self.user_dao.set_pg(user_id, pg_id).await?;
        Ok(())
    }
}
