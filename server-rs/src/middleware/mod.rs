pub mod auth;
pub mod rate_limit;
pub mod roles;

pub use auth::*;
pub use rate_limit::*;
pub use roles::*;
