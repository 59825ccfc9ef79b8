#[allow(unused_imports)]
pub mod prelude {
    pub use super::complaint::Entity as Complaint;
    pub use super::pg::Entity as Pg;
    pub use super::refresh_token::Entity as RefreshToken;
    pub use super::role::Entity as RoleRecord;
    pub use super::room::Entity as Room;
    pub use super::user::Entity as User;
}

pub mod complaint;
pub mod pg;
pub mod refresh_token;
pub mod role;
pub mod room;
pub mod user;
