use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::PgPool;

use notes_core_db::{Entity, StoreError, StoreResult};

use crate::executor::Executor;
use crate::utils::TryFromRow;

/// Entities the PostgreSQL store can read back from a row.
pub trait PgEntity: Entity + TryFromRow<PgRow> {}

impl<E> PgEntity for E where E: Entity + TryFromRow<PgRow> {}

/// PostgreSQL implementation of every repository trait.
///
/// One generic store serves all tables: table and column names come from
/// the entity's `TABLE` / `COLUMNS` constants, never from caller input.
/// A store built over a transaction executor is the handle returned by
/// `begin`.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pub executor: Executor,
}

impl PostgresStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            executor: Executor::pool(pool),
        }
    }

    pub fn with_executor(executor: Executor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn is_transaction(&self) -> bool {
        self.executor.is_transaction()
    }
}

/// Reject columns that are not part of `E`'s table.
pub(crate) fn check_column<E: Entity>(column: &str) -> StoreResult<()> {
    if E::has_column(column) {
        Ok(())
    } else {
        Err(StoreError::InvalidColumn {
            table: E::TABLE,
            column: column.to_string(),
        })
    }
}

/// `$1, $2, ... $n`
pub(crate) fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|index| format!("${index}"))
        .collect::<Vec<_>>()
        .join(", ")
}
