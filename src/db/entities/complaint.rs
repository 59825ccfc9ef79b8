use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "complaints")]
pub struct Model {
    #[sea_orm(indexed)]
    pub tenant_id: Uuid,
    #[sea_orm(indexed)]
    pub pg_id: Option<Uuid>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
}

impl ActiveModelBehavior for ActiveModel {}
