use async_trait::async_trait;

use crate::error::StoreResult;

/// Stores able to open a transaction.
///
/// The transaction handle is itself a store: every repository trait the
/// store implements is available on the handle, scoped to the transaction.
/// Dropping a handle without committing rolls the transaction back, on
/// every exit path including unwinding.
///
/// # Example
/// ```ignore
/// let tx = store.begin().await?;
/// let program = tx.create(program).await?;
/// tx.set_alias(EntityType::Programs, program.id, "acme").await?;
/// tx.commit().await?;
/// ```
#[async_trait]
pub trait Transactional: Send + Sync {
    type Tx: TransactionHandle;

    async fn begin(&self) -> StoreResult<Self::Tx>;
}

#[async_trait]
pub trait TransactionHandle: Send + Sync + Sized {
    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;
}
