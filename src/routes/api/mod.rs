pub mod auth;
pub mod complaints;
pub mod pg;
pub mod public;
pub mod roles;
pub mod rooms;
mod router;
pub mod users;
pub mod views;

pub use router::router;
