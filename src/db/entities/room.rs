use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(indexed)]
    pub pg_id: Uuid,
    pub room_number: String,
    pub capacity: i32,
    #[sea_orm(default_value = 0)]
    pub occupied_beds: i32,
    #[sea_orm(default_value = true)]
    pub is_available: bool,
    pub room_type: Option<String>,
    pub price: Option<f64>,
    pub floor_number: Option<i32>,
    pub description: Option<String>,
    /// JSON array of strings.
    pub amenities: Json,
    pub images: Json,
    #[sea_orm(belongs_to, from = "pg_id", to = "id", on_delete = "Cascade")]
    pub pg: HasOne<super::pg::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
