use async_trait::async_trait;
use tracing::{debug, instrument};

use notes_core_db::{Create, StoreError, StoreResult};

use super::store::{placeholders, PgEntity, PostgresStore};
use crate::utils::{bind_value, decode_row};

impl PostgresStore {
    pub(super) async fn create_impl<E: PgEntity>(&self, entity: E) -> StoreResult<E> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders(E::COLUMNS.len())
        );

        let mut query = sqlx::query(&sql);
        for column in E::COLUMNS {
            let value = entity.column(column).ok_or_else(|| StoreError::InvalidColumn {
                table: E::TABLE,
                column: column.to_string(),
            })?;
            query = bind_value(query, value);
        }

        let row = self
            .executor
            .fetch_optional(E::TABLE, query)
            .await?
            .ok_or_else(|| StoreError::Query {
                message: format!("insert into {} returned no row", E::TABLE),
            })?;
        let created: E = decode_row(&row)?;
        debug!(table = E::TABLE, id = created.get_id(), "row inserted");
        Ok(created)
    }
}

#[async_trait]
impl<E: PgEntity> Create<E> for PostgresStore {
    #[instrument(level = "debug", skip(self, entity))]
    async fn create(&self, entity: E) -> StoreResult<E> {
        self.create_impl(entity).await
    }
}

#[cfg(test)]
mod tests {
    use notes_core_db::{Create, StoreError, TagModel};
    use serial_test::serial;

    use super::super::test_utils::{program, tag};
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_create_returns_generated_id() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;

        let first = ctx.store.create(program("first")).await?;
        let second = ctx.store.create(program("second")).await?;
        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(second.platform.as_deref(), Some("hackerone"));
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_unique_violation_is_conflict() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;

        ctx.store.create(tag("xss")).await?;
        let duplicate: Result<TagModel, _> = ctx.store.create(tag("xss")).await;
        assert!(matches!(duplicate, Err(StoreError::Conflict { table: "tag", .. })));
        Ok(())
    }
}
