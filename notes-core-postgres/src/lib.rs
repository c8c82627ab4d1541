pub mod backend;
pub mod config;
pub mod executor;
pub mod repository;
pub mod utils;

pub use backend::{BackendError, NotesStore, PostgresBackend};
pub use config::{BackendConfig, ConfigError};
pub use executor::Executor;
pub use repository::PostgresStore;

#[cfg(test)]
pub mod test_helper;
