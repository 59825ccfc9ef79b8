pub mod base;
pub mod base_traits;
mod context;
pub mod complaint_dao;
pub mod error;
pub mod pg_dao;
pub mod refresh_token_dao;
pub mod role_dao;
pub mod room_dao;
pub mod user_dao;

pub use base::{DaoBase, DaoPager, PaginatedResponse};
pub use base_traits::{
    HasCreatedAtColumn, HasIdActiveModel, HasSoftDeleteColumn, SoftDeleteActiveModel,
    TimestampedActiveModel,
};
pub use complaint_dao::{ComplaintDao, NewComplaint};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use pg_dao::PgDao;
pub use refresh_token_dao::RefreshTokenDao;
pub use role_dao::RoleDao;
pub use room_dao::RoomDao;
pub use user_dao::{NewUser, UserDao};
