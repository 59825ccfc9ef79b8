use sea_orm::{ColumnTrait, DatabaseConnection, Order, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{pg, prelude::Pg};

#[derive(Clone)]
pub struct PgDao {
    db: DatabaseConnection,
}

impl DaoBase for PgDao {
    type Entity = Pg;
    const LABEL: &'static str = "PG";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl PgDao {
    pub async fn create_pg(&self, name: &str, address: &str, owner_id: Uuid) -> DaoResult<pg::Model> {
        let model = pg::ActiveModel {
            name: Set(name.to_string()),
            address: Set(address.to_string()),
            owner_id: Set(owner_id),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list_all(&self) -> DaoResult<Vec<pg::Model>> {
        self.find_iter(None, Some((pg::Column::Name, Order::Asc)), |query| query)
            .collect_all()
            .await
    }

    pub async fn list_owned_by(&self, owner_id: Uuid) -> DaoResult<Vec<pg::Model>> {
        self.find_iter(None, Some((pg::Column::Name, Order::Asc)), move |query| {
            query.filter(pg::Column::OwnerId.eq(owner_id))
        })
        .collect_all()
        .await
    }

    pub async fn update_details(
        &self,
        id: Uuid,
        name: Option<String>,
        address: Option<String>,
    ) -> DaoResult<pg::Model> {
        self.update(id, move |active| {
            if let Some(name) = name {
                active.name = Set(name);
            }
            if let Some(address) = address {
                active.address = Set(address);
            }
        })
        .await
    }
}
