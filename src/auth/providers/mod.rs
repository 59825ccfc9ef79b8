pub mod local;
mod registry;

pub use local::{LocalAuthProvider, TokenLifetimes};
pub use registry::{AuthProvider, AuthProviderId, AuthProviders};
