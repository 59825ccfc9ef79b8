use sea_orm::DatabaseConnection;

use super::{ComplaintDao, DaoBase, PgDao, RefreshTokenDao, RoleDao, RoomDao, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn refresh_token(&self) -> RefreshTokenDao {
        DaoBase::new(&self.db)
    }

    pub fn pg(&self) -> PgDao {
        DaoBase::new(&self.db)
    }

    pub fn room(&self) -> RoomDao {
        DaoBase::new(&self.db)
    }

    pub fn complaint(&self) -> ComplaintDao {
        DaoBase::new(&self.db)
    }

    pub fn role(&self) -> RoleDao {
        DaoBase::new(&self.db)
    }
}
