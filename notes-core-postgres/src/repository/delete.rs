use async_trait::async_trait;
use tracing::{debug, instrument};

use notes_core_db::{Delete, StoreError, StoreResult};

use super::store::{PgEntity, PostgresStore};
use crate::utils::decode_row;

impl PostgresStore {
    pub(super) async fn delete_impl<E: PgEntity>(&self, id: i64) -> StoreResult<E> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING *", E::TABLE);
        let row = self
            .executor
            .fetch_optional(E::TABLE, sqlx::query(&sql).bind(id))
            .await?
            .ok_or_else(|| StoreError::not_found(E::TABLE, id))?;

        debug!(table = E::TABLE, id, "row deleted");
        decode_row(&row)
    }
}

#[async_trait]
impl<E: PgEntity> Delete<E> for PostgresStore {
    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, id: i64) -> StoreResult<E> {
        self.delete_impl(id).await
    }
}
