use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pgs")]
pub struct Model {
    pub name: String,
    pub address: String,
    #[sea_orm(indexed)]
    pub owner_id: Uuid,
    #[sea_orm(has_many)]
    pub rooms: HasMany<super::room::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
