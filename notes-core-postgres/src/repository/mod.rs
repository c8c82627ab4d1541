pub mod alias_store;
pub mod create;
pub mod db_init;
pub mod delete;
pub mod find_where;
pub mod first;
pub mod list;
pub mod rows;
pub mod store;
pub mod transaction;
pub mod updates;

#[cfg(test)]
pub(crate) mod test_utils;

pub use store::{PgEntity, PostgresStore};
