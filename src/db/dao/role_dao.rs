use sea_orm::{DatabaseConnection, EntityTrait, Order, PaginatorTrait, Set};

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::{
    auth::Role,
    db::entities::{prelude::RoleRecord, role},
};

#[derive(Clone)]
pub struct RoleDao {
    db: DatabaseConnection,
}

impl DaoBase for RoleDao {
    type Entity = RoleRecord;
    const LABEL: &'static str = "Role";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RoleDao {
    pub async fn count(&self) -> DaoResult<u64> {
        RoleRecord::find()
            .count(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn insert_role(&self, role: Role) -> DaoResult<role::Model> {
        let model = role::ActiveModel {
            name: Set(role.as_str().to_string()),
            description: Set(role.description().to_string()),
            role_value: Set(role.value()),
            is_active: Set(true),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list_all(&self) -> DaoResult<Vec<role::Model>> {
        self.find_iter(None, Some((role::Column::RoleValue, Order::Asc)), |query| query)
            .collect_all()
            .await
    }
}
