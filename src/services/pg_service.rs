use serde::Deserialize;
use uuid::Uuid;

use super::{user_service::UserService, validation::FieldErrors};
use crate::{
    auth::{
        Role,
        policy::{self, Actor, Capability},
    },
    db::dao::{DaoBase, PgDao},
    db::entities::pg,
    error::AppError,
};

const NAME_MAX: usize = 255;
const ADDRESS_MAX: usize = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePgRequest {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePgRequest {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone)]
pub struct PgService {
    pg_dao: PgDao,
    users: UserService,
}

impl PgService {
    pub fn new(pg_dao: PgDao, users: UserService) -> Self {
        Self { pg_dao, users }
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<pg::Model>, AppError> {
        policy::require(actor.role, Capability::ListPgs)?;
        if actor.is_super_admin() {
            Ok(self.pg_dao.list_all().await?)
        } else {
            Ok(self.pg_dao.list_owned_by(actor.id).await?)
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<pg::Model, AppError> {
        Ok(self.pg_dao.find_by_id(id).await?)
    }

    /// The caller becomes the owner. An unattached PGAdmin is also attached
    /// to the new PG so they can start adding staff and tenants.
    pub async fn create(&self, actor: &Actor, request: CreatePgRequest) -> Result<pg::Model, AppError> {
        policy::require(actor.role, Capability::CreatePg)?;
        FieldErrors::new()
            .required("Name", &request.name)
            .max_len("Name", &request.name, NAME_MAX)
            .required("Address", &request.address)
            .max_len("Address", &request.address, ADDRESS_MAX)
            .finish()?;

        let pg = self
            .pg_dao
            .create_pg(request.name.trim(), request.address.trim(), actor.id)
            .await?;

        if actor.role == Role::PgAdmin && actor.pg_id.is_none() {
            self.users.attach_to_pg(&actor.id, pg.id).await?;
        }
        tracing::info!(pg_id = %pg.id, owner_id = %actor.id, "pg created");
        Ok(pg)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdatePgRequest,
    ) -> Result<pg::Model, AppError> {
        policy::require(actor.role, Capability::UpdatePg)?;
        let existing = self.pg_dao.find_by_id(id).await?;
        if actor.role == Role::PgAdmin && existing.owner_id != actor.id {
            return Err(AppError::unauthorized("You can only update PGs you own"));
        }

        let mut errors = FieldErrors::new();
        if let Some(name) = request.name.as_deref() {
            errors.required("Name", name).max_len("Name", name, NAME_MAX);
        }
        if let Some(address) = request.address.as_deref() {
            errors
                .required("Address", address)
                .max_len("Address", address, ADDRESS_MAX);
        }
        errors.finish()?;

        Ok(self
            .pg_dao
            .update_details(
                id,
                request.name.map(|name| name.trim().to_string()),
                request.address.map(|address| address.trim().to_string()),
            )
            .await?)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        policy::require(actor.role, Capability::DeletePg)?;
        self.pg_dao.delete(id).await?;
        Ok(())
    }
}
