use async_trait::async_trait;
use tracing::debug;

use notes_core_db::{StoreError, StoreResult, TransactionHandle, Transactional};

use super::store::PostgresStore;
use crate::executor::Executor;

#[async_trait]
impl Transactional for PostgresStore {
    type Tx = PostgresStore;

    /// Open a transaction on a fresh pool connection. Dropping the returned
    /// store without committing rolls the transaction back.
    async fn begin(&self) -> StoreResult<PostgresStore> {
        match &self.executor {
            Executor::Pool(pool) => {
                let executor = Executor::begin(pool).await?;
                debug!("transaction opened");
                Ok(PostgresStore::with_executor(executor))
            }
            Executor::Transaction(_) => Err(StoreError::Transaction {
                message: "nested transactions are not supported".to_string(),
            }),
        }
    }
}

#[async_trait]
impl TransactionHandle for PostgresStore {
    async fn commit(self) -> StoreResult<()> {
        self.executor.commit().await?;
        debug!("transaction committed");
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.executor.rollback().await?;
        debug!("transaction rolled back");
        Ok(())
    }
}
