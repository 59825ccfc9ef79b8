use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

/// Stored refresh token. Only the argon2 hash of the opaque value is kept.
#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTimeWithTimeZone,
    #[sea_orm(default_value = false)]
    pub revoked: bool,
    pub revoked_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_usable(&self, now: DateTimeWithTimeZone) -> bool {
        !self.revoked && !self.is_deleted && self.expires_at > now
    }
}
