use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

/// Reference row describing one `auth::Role`.
#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
    #[sea_orm(unique)]
    pub role_value: i32,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
}

impl ActiveModelBehavior for ActiveModel {}
