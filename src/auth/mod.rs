pub mod bootstrap;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod providers;
mod types;

pub use types::{Admins, AllowedRoles, Claims, Operators, Role, SuperAdminOnly, Tenants, TokenBundle};
