use sea_orm::DatabaseConnection;

use crate::{
    auth::providers::AuthProviders,
    db::dao::{DaoContext, RefreshTokenDao},
    services::{
        auth_service::AuthService, complaint_service::ComplaintService, pg_service::PgService,
        role_service::RoleService, room_service::RoomService, user_service::UserService,
    },
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user(), self.daos.refresh_token())
    }

    pub fn pg(&self) -> PgService {
        PgService::new(self.daos.pg(), self.user())
    }

    pub fn room(&self) -> RoomService {
        RoomService::new(self.daos.room(), self.daos.pg())
    }

    pub fn complaint(&self) -> ComplaintService {
        ComplaintService::new(self.daos.complaint(), self.user())
    }

    pub fn role(&self) -> RoleService {
        RoleService::new(self.daos.role())
    }

    pub fn auth<'a>(&self, providers: &'a AuthProviders) -> AuthService<'a> {
        AuthService::new(providers)
    }

    pub fn refresh_token_dao(&self) -> RefreshTokenDao {
        self.daos.refresh_token()
    }
}
