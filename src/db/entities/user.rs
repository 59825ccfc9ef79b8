use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    /// Numeric `auth::Role` value.
    pub role: i32,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
    #[sea_orm(indexed)]
    pub pg_id: Option<Uuid>,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(has_many)]
    pub refresh_tokens: HasMany<super::refresh_token::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn role(&self) -> Option<crate::auth::Role> {
        crate::auth::Role::try_from(self.role).ok()
    }
}
