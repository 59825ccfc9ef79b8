use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;

use super::validation::FieldErrors;
use crate::{
    auth::{
        Role,
        policy::{self, Actor, Capability},
    },
    db::dao::{DaoBase, PgDao, RoomDao},
    db::entities::room,
    error::AppError,
};

const ROOM_NUMBER_MAX: usize = 50;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub pg_id: Uuid,
    pub room_number: String,
    pub capacity: i32,
    pub room_type: Option<String>,
    pub price: Option<f64>,
    pub floor_number: Option<i32>,
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub room_number: Option<String>,
    pub capacity: Option<i32>,
    pub occupied_beds: Option<i32>,
    pub is_available: Option<bool>,
    pub room_type: Option<String>,
    pub price: Option<f64>,
    pub floor_number: Option<i32>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct RoomService {
    room_dao: RoomDao,
    pg_dao: PgDao,
}

impl RoomService {
    pub fn new(room_dao: RoomDao, pg_dao: PgDao) -> Self {
        Self { room_dao, pg_dao }
    }

    pub async fn list_all(&self) -> Result<Vec<room::Model>, AppError> {
        Ok(self.room_dao.list_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<room::Model, AppError> {
        Ok(self.room_dao.find_by_id(id).await?)
    }

    pub async fn list_for_pg(&self, pg_id: Uuid) -> Result<Vec<room::Model>, AppError> {
        self.pg_dao.find_by_id(pg_id).await?;
        Ok(self.room_dao.list_for_pg(pg_id).await?)
    }

    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateRoomRequest,
    ) -> Result<room::Model, AppError> {
        policy::require(actor.role, Capability::CreateRoom)?;
        FieldErrors::new()
            .required("Room number", &request.room_number)
            .max_len("Room number", &request.room_number, ROOM_NUMBER_MAX)
            .check(request.capacity > 0, "Capacity must be greater than 0")
            .check(
                request.price.is_none_or(|price| price >= 0.0),
                "Price must not be negative",
            )
            .finish()?;

        self.ensure_pg_scope(actor, request.pg_id).await?;

        let room_number = request.room_number.trim().to_string();
        if self
            .room_dao
            .number_taken(request.pg_id, &room_number, None)
            .await?
        {
            return Err(AppError::bad_request("Room number already exists in this PG"));
        }

        let model = room::ActiveModel {
            pg_id: Set(request.pg_id),
            room_number: Set(room_number),
            capacity: Set(request.capacity),
            occupied_beds: Set(0),
            is_available: Set(true),
            room_type: Set(request.room_type),
            price: Set(request.price),
            floor_number: Set(request.floor_number),
            description: Set(request.description),
            amenities: Set(serde_json::json!(request.amenities)),
            images: Set(serde_json::json!(request.images)),
            ..Default::default()
        };
        Ok(self.room_dao.create_room(model).await?)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateRoomRequest,
    ) -> Result<room::Model, AppError> {
        policy::require(actor.role, Capability::UpdateRoom)?;
        let existing = self.room_dao.find_by_id(id).await?;
        self.ensure_pg_scope(actor, existing.pg_id).await?;

        let capacity = request.capacity.unwrap_or(existing.capacity);
        let occupied = request.occupied_beds.unwrap_or(existing.occupied_beds);
        let mut errors = FieldErrors::new();
        if let Some(number) = request.room_number.as_deref() {
            errors
                .required("Room number", number)
                .max_len("Room number", number, ROOM_NUMBER_MAX);
        }
        errors
            .check(capacity > 0, "Capacity must be greater than 0")
            .check(
                (0..=capacity).contains(&occupied),
                "Occupied beds must be between 0 and capacity",
            )
            .check(
                request.price.is_none_or(|price| price >= 0.0),
                "Price must not be negative",
            )
            .finish()?;

        if let Some(number) = request.room_number.as_deref()
            && self
                .room_dao
                .number_taken(existing.pg_id, number.trim(), Some(id))
                .await?
        {
            return Err(AppError::bad_request("Room number already exists in this PG"));
        }

        let updated = self
            .room_dao
            .apply_changes(id, move |active| {
                if let Some(number) = request.room_number {
                    active.room_number = Set(number.trim().to_string());
                }
                active.capacity = Set(capacity);
                active.occupied_beds = Set(occupied);
                if let Some(is_available) = request.is_available {
                    active.is_available = Set(is_available);
                }
                if request.room_type.is_some() {
                    active.room_type = Set(request.room_type);
                }
                if request.price.is_some() {
                    active.price = Set(request.price);
                }
                if request.floor_number.is_some() {
                    active.floor_number = Set(request.floor_number);
                }
                if request.description.is_some() {
                    active.description = Set(request.description);
                }
                if let Some(amenities) = request.amenities {
                    active.amenities = Set(serde_json::json!(amenities));
                }
                if let Some(images) = request.images {
                    active.images = Set(serde_json::json!(images));
                }
            })
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        policy::require(actor.role, Capability::DeleteRoom)?;
        let existing = self.room_dao.find_by_id(id).await?;
        self.ensure_pg_scope(actor, existing.pg_id).await?;
        self.room_dao.delete(id).await?;
        Ok(())
    }

    /// A PGAdmin may act on the PG they belong to or on PGs they own.
    async fn ensure_pg_scope(&self, actor: &Actor, pg_id: Uuid) -> Result<(), AppError> {
        let pg = self.pg_dao.find_by_id(pg_id).await?;
        if actor.role == Role::PgAdmin && pg.owner_id != actor.id {
            policy::check_pg_scope(actor, pg.id)?;
        }
        Ok(())
    }
}
