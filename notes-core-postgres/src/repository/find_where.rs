use async_trait::async_trait;
use tracing::instrument;

use notes_core_db::{FindWhere, KeyFilter, StoreResult};

use super::store::{check_column, PgEntity, PostgresStore};
use crate::utils::decode_rows;

impl PostgresStore {
    pub(super) async fn find_where_impl<E: PgEntity>(&self, filter: &KeyFilter) -> StoreResult<Vec<E>> {
        for column in filter.columns() {
            check_column::<E>(column)?;
        }
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let rows = match filter {
            KeyFilter::Int { column, values } => {
                let sql = format!("SELECT * FROM {} WHERE {column} = ANY($1) ORDER BY id", E::TABLE);
                self.executor
                    .fetch_all(E::TABLE, sqlx::query(&sql).bind(values))
                    .await?
            }
            KeyFilter::Text { column, values } => {
                let sql = format!("SELECT * FROM {} WHERE {column} = ANY($1) ORDER BY id", E::TABLE);
                self.executor
                    .fetch_all(E::TABLE, sqlx::query(&sql).bind(values))
                    .await?
            }
            KeyFilter::Reference {
                id_column,
                type_column,
                values,
            } => {
                let ids: Vec<i64> = values.iter().map(|(id, _)| *id).collect();
                let kinds: Vec<String> = values.iter().map(|(_, kind)| kind.as_str().to_string()).collect();
                let sql = format!(
                    "SELECT t.* FROM {} t \
                     JOIN UNNEST($1::BIGINT[], $2::TEXT[]) AS k(id, kind) \
                     ON t.{id_column} = k.id AND t.{type_column} = k.kind \
                     ORDER BY t.id",
                    E::TABLE
                );
                self.executor
                    .fetch_all(E::TABLE, sqlx::query(&sql).bind(ids).bind(kinds))
                    .await?
            }
        };

        decode_rows(&rows)
    }
}

#[async_trait]
impl<E: PgEntity> FindWhere<E> for PostgresStore {
    #[instrument(level = "debug", skip(self))]
    async fn find_where(&self, filter: &KeyFilter) -> StoreResult<Vec<E>> {
        self.find_where_impl(filter).await
    }
}

#[cfg(test)]
mod tests {
    use notes_core_api::EntityType;
    use notes_core_db::{EndpointModel, FindWhere, KeyFilter, ProgramModel, StoreError, TaggingModel};
    use serial_test::serial;

    use super::super::test_utils::seed;
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_find_where_int_and_text() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let seeded = seed(&ctx.store).await?;

        let endpoints: Vec<EndpointModel> = ctx
            .store
            .find_where(&KeyFilter::int("program_id", [seeded.acme.id, seeded.globex.id, -1]))
            .await?;
        assert_eq!(endpoints.len(), 2);
        assert!(endpoints.iter().all(|e| e.program_id == seeded.acme.id));

        let programs: Vec<ProgramModel> = ctx
            .store
            .find_where(&KeyFilter::text("name", ["globex", "missing"]))
            .await?;
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].id, seeded.globex.id);
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_find_where_reference_pairs() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let seeded = seed(&ctx.store).await?;

        let taggings: Vec<TaggingModel> = ctx
            .store
            .find_where(&KeyFilter::reference(
                "reference_id",
                "reference_type",
                [(seeded.acme.id, EntityType::Programs), (seeded.acme.id, EntityType::Words)],
            ))
            .await?;
        assert_eq!(taggings.len(), 1);
        assert_eq!(taggings[0].tag_id, seeded.tag.id);
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_find_where_rejects_unknown_column() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let result: Result<Vec<ProgramModel>, _> =
            ctx.store.find_where(&KeyFilter::int("program_id", [1])).await;
        assert!(matches!(result, Err(StoreError::InvalidColumn { .. })));
        Ok(())
    }
}
