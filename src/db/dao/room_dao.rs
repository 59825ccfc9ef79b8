use sea_orm::{ColumnTrait, DatabaseConnection, Order, QueryFilter};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::Room, room};

#[derive(Clone)]
pub struct RoomDao {
    db: DatabaseConnection,
}

impl DaoBase for RoomDao {
    type Entity = Room;
    const LABEL: &'static str = "Room";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RoomDao {
    pub async fn create_room(&self, room: room::ActiveModel) -> DaoResult<room::Model> {
        self.create(room).await
    }

    pub async fn list_all(&self) -> DaoResult<Vec<room::Model>> {
        self.find_iter(None, Some((room::Column::RoomNumber, Order::Asc)), |query| query)
            .collect_all()
            .await
    }

    pub async fn list_for_pg(&self, pg_id: Uuid) -> DaoResult<Vec<room::Model>> {
        self.find_iter(None, Some((room::Column::RoomNumber, Order::Asc)), move |query| {
            query.filter(room::Column::PgId.eq(pg_id))
        })
        .collect_all()
        .await
    }

    pub async fn number_taken(
        &self,
        pg_id: Uuid,
        room_number: &str,
        except: Option<Uuid>,
    ) -> DaoResult<bool> {
        let room_number = room_number.to_string();
        let existing = self
            .find_one(move |query| {
                let query = query
                    .filter(room::Column::PgId.eq(pg_id))
                    .filter(room::Column::RoomNumber.eq(room_number));
                match except {
                    Some(id) => query.filter(room::Column::Id.ne(id)),
                    None => query,
                }
            })
            .await?;
        Ok(existing.is_some())
    }

    pub async fn apply_changes(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut room::ActiveModel) + Send,
    ) -> DaoResult<room::Model> {
        self.update(id, apply).await
    }
}
