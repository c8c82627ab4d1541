use async_trait::async_trait;
use sqlx::Row;
use tracing::instrument;

use notes_core_db::{List, Page, PageRequest, StoreError, StoreResult};

use super::store::{PgEntity, PostgresStore};
use crate::utils::{decode_rows, map_sqlx_error};

impl PostgresStore {
    pub(super) async fn list_impl<E: PgEntity>(&self, page: PageRequest) -> StoreResult<Page<E>> {
        let count_sql = format!("SELECT COUNT(*) AS total FROM {}", E::TABLE);
        let total: i64 = self
            .executor
            .fetch_optional(E::TABLE, sqlx::query(&count_sql))
            .await?
            .map(|row| row.try_get::<i64, _>("total"))
            .transpose()
            .map_err(|e| map_sqlx_error(E::TABLE, e))?
            .unwrap_or(0);

        let limit = i64::try_from(page.limit).map_err(|_| StoreError::Query {
            message: format!("page limit {} out of range", page.limit),
        })?;
        let offset = i64::try_from(page.offset).map_err(|_| StoreError::Query {
            message: format!("page offset {} out of range", page.offset),
        })?;
        let sql = format!("SELECT * FROM {} ORDER BY id LIMIT $1 OFFSET $2", E::TABLE);
        let rows = self
            .executor
            .fetch_all(E::TABLE, sqlx::query(&sql).bind(limit).bind(offset))
            .await?;

        Ok(Page::new(decode_rows(&rows)?, total.max(0) as usize, page))
    }
}

#[async_trait]
impl<E: PgEntity> List<E> for PostgresStore {
    #[instrument(level = "debug", skip(self))]
    async fn list(&self, page: PageRequest) -> StoreResult<Page<E>> {
        self.list_impl(page).await
    }
}

#[cfg(test)]
mod tests {
    use notes_core_db::{Create, List, PageRequest, WordModel};
    use serial_test::serial;

    use super::super::test_utils::word;
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_list_pages_in_id_order() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let before = List::<WordModel>::list(&ctx.store, PageRequest::new(1, 0)).await?.total;

        let mut created = Vec::new();
        for value in ["alpha", "beta", "gamma"] {
            created.push(ctx.store.create(word(value)).await?);
        }

        let page: notes_core_db::Page<WordModel> = ctx
            .store
            .list(PageRequest::new(2, before + 1))
            .await?;
        assert_eq!(page.total, before + 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, created[1].id);
        assert_eq!(page.items[1].id, created[2].id);
        assert!(!page.has_more());
        Ok(())
    }
}
