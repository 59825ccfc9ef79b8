pub trait HasCreatedAtColumn: sea_orm::EntityTrait {
    fn created_at_column() -> Self::Column;
}

/// Entities whose rows are flagged instead of removed.
pub trait HasSoftDeleteColumn: sea_orm::EntityTrait {
    fn deleted_column() -> Self::Column;
}

pub trait HasIdActiveModel {
    fn set_id(&mut self, id: uuid::Uuid);
}

pub trait TimestampedActiveModel {
    fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone);
    fn set_updated_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone);
}

pub trait SoftDeleteActiveModel {
    fn set_deleted(&mut self, deleted: bool);
}
