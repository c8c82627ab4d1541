pub mod cache;
pub mod crud;
pub mod error;
pub mod loader;
pub mod memory;
pub mod models;
pub mod repository;
pub mod service;
pub mod utils;

pub use error::*;
pub use memory::MemoryStore;
pub use models::*;
pub use repository::*;

#[cfg(test)]
pub(crate) mod test_utils;
