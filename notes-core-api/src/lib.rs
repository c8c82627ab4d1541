pub mod auth;
pub mod context;
pub mod domain;
pub mod error;

pub use auth::*;
pub use context::*;
pub use domain::*;
pub use error::*;
