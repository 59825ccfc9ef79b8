use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::{
    auth::Role,
    db::entities::{prelude::User, user},
};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;
    const LABEL: &'static str = "User";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub pg_id: Option<Uuid>,
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.find_one(move |query| query.filter(user::Column::Email.eq(email)))
            .await
    }

    /// True when any other row holds `email`. Soft-deleted users still own
    /// their address because the column is unique.
    pub async fn email_taken(&self, email: &str, except: Option<Uuid>) -> DaoResult<bool> {
        let mut query = User::find().filter(user::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        let existing = query.one(self.db()).await.map_err(DaoLayerError::Db)?;
        Ok(existing.is_some())
    }

    pub async fn create_user(&self, new_user: NewUser) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role.value()),
            is_active: Set(new_user.is_active),
            pg_id: Set(new_user.pg_id),
            last_login_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn set_last_login(
        &self,
        id: &Uuid,
        at: &chrono::DateTime<chrono::FixedOffset>,
    ) -> DaoResult<()> {
        let at = *at;
        self.update(*id, move |active| {
            active.last_login_at = Set(Some(at));
        })
        .await
        .map(|_| ())
    }

    pub async fn set_pg(&self, id: &Uuid, pg_id: Uuid) -> DaoResult<user::Model> {
        self.update(*id, move |active| {
            active.pg_id = Set(Some(pg_id));
        })
        .await
    }

    pub async fn list_all(&self) -> DaoResult<Vec<user::Model>> {
        self.find_iter(None, Some((user::Column::Email, Order::Asc)), |query| query)
            .collect_all()
            .await
    }

    /// Users attached to `pg_id`, SuperAdmins excluded.
    pub async fn list_for_pg(&self, pg_id: Uuid) -> DaoResult<Vec<user::Model>> {
        self.find_iter(None, Some((user::Column::Email, Order::Asc)), move |query| {
            query
                .filter(user::Column::PgId.eq(pg_id))
                .filter(user::Column::Role.ne(Role::SuperAdmin.value()))
        })
        .collect_all()
        .await
    }

    pub async fn find_any_with_role(&self, role: Role) -> DaoResult<Option<user::Model>> {
        self.find_one(move |query| query.filter(user::Column::Role.eq(role.value())))
            .await
    }
}
