use std::sync::Arc;

use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use notes_core_db::{StoreError, StoreResult};

use crate::utils::map_sqlx_error;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Where queries run: straight on the pool, or inside one shared
/// transaction.
///
/// A transaction executor holds the transaction behind a mutex so that
/// every clone of it issues its queries on the same connection. Once the
/// transaction is committed or rolled back the slot is empty and further
/// queries fail.
#[derive(Clone)]
pub enum Executor {
    Pool(Arc<PgPool>),
    Transaction(Arc<Mutex<Option<Transaction<'static, Postgres>>>>),
}

impl Executor {
    pub fn pool(pool: Arc<PgPool>) -> Self {
        Executor::Pool(pool)
    }

    pub async fn begin(pool: &PgPool) -> StoreResult<Self> {
        let tx = pool.begin().await.map_err(|e| StoreError::Transaction {
            message: e.to_string(),
        })?;
        Ok(Executor::Transaction(Arc::new(Mutex::new(Some(tx)))))
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self, Executor::Transaction(_))
    }

    pub async fn fetch_all(&self, table: &'static str, query: PgQuery<'_>) -> StoreResult<Vec<PgRow>> {
        match self {
            Executor::Pool(pool) => query.fetch_all(pool.as_ref()).await,
            Executor::Transaction(tx) => {
                let mut guard = tx.lock().await;
                let transaction = guard.as_mut().ok_or_else(consumed)?;
                query.fetch_all(&mut **transaction).await
            }
        }
        .map_err(|e| map_sqlx_error(table, e))
    }

    pub async fn fetch_optional(
        &self,
        table: &'static str,
        query: PgQuery<'_>,
    ) -> StoreResult<Option<PgRow>> {
        match self {
            Executor::Pool(pool) => query.fetch_optional(pool.as_ref()).await,
            Executor::Transaction(tx) => {
                let mut guard = tx.lock().await;
                let transaction = guard.as_mut().ok_or_else(consumed)?;
                query.fetch_optional(&mut **transaction).await
            }
        }
        .map_err(|e| map_sqlx_error(table, e))
    }

    pub async fn execute(&self, table: &'static str, query: PgQuery<'_>) -> StoreResult<PgQueryResult> {
        match self {
            Executor::Pool(pool) => query.execute(pool.as_ref()).await,
            Executor::Transaction(tx) => {
                let mut guard = tx.lock().await;
                let transaction = guard.as_mut().ok_or_else(consumed)?;
                query.execute(&mut **transaction).await
            }
        }
        .map_err(|e| map_sqlx_error(table, e))
    }

    pub async fn commit(&self) -> StoreResult<()> {
        self.take()
            .await?
            .commit()
            .await
            .map_err(|e| StoreError::Transaction {
                message: e.to_string(),
            })
    }

    pub async fn rollback(&self) -> StoreResult<()> {
        self.take()
            .await?
            .rollback()
            .await
            .map_err(|e| StoreError::Transaction {
                message: e.to_string(),
            })
    }

    async fn take(&self) -> StoreResult<Transaction<'static, Postgres>> {
        match self {
            Executor::Pool(_) => Err(StoreError::Transaction {
                message: "no transaction is open on this executor".to_string(),
            }),
            Executor::Transaction(tx) => tx.lock().await.take().ok_or_else(consumed),
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Executor::Pool(_) => f.write_str("Executor::Pool"),
            Executor::Transaction(_) => f.write_str("Executor::Transaction"),
        }
    }
}

fn consumed() -> StoreError {
    StoreError::Transaction {
        message: "transaction has been consumed".to_string(),
    }
}
