pub mod auth_service;
pub mod complaint_service;
pub mod context;
pub mod pg_service;
pub mod role_service;
pub mod room_service;
pub mod user_service;
pub mod validation;

pub use context::ServiceContext;
