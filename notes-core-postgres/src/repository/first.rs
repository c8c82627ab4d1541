use async_trait::async_trait;
use tracing::instrument;

use notes_core_db::{First, StoreError, StoreResult};

use super::store::{PgEntity, PostgresStore};
use crate::utils::decode_row;

impl PostgresStore {
    pub(super) async fn first_impl<E: PgEntity>(&self, id: i64) -> StoreResult<E> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", E::TABLE);
        let row = self
            .executor
            .fetch_optional(E::TABLE, sqlx::query(&sql).bind(id))
            .await?
            .ok_or_else(|| StoreError::not_found(E::TABLE, id))?;
        decode_row(&row)
    }
}

#[async_trait]
impl<E: PgEntity> First<E> for PostgresStore {
    #[instrument(level = "debug", skip(self))]
    async fn first(&self, id: i64) -> StoreResult<E> {
        self.first_impl(id).await
    }
}
