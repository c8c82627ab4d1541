use async_trait::async_trait;
use sqlx::Row;
use tracing::{debug, instrument};

use notes_core_api::EntityType;
use notes_core_db::{alias_name_hash, AliasModel, AliasStore, Entity, StoreError, StoreResult};

use super::store::PostgresStore;
use crate::utils::{decode_rows, map_sqlx_error};

impl PostgresStore {
    /// Alias rows whose name hashes like `alias`, collisions included.
    async fn aliases_by_hash(&self, alias: &str) -> StoreResult<Vec<AliasModel>> {
        let name_hash = alias_name_hash(alias)?;
        let rows = self
            .executor
            .fetch_all(
                AliasModel::TABLE,
                sqlx::query("SELECT * FROM alias WHERE name_hash = $1").bind(name_hash),
            )
            .await?;
        decode_rows(&rows)
    }
}

#[async_trait]
impl AliasStore for PostgresStore {
    #[instrument(level = "debug", skip(self))]
    async fn resolve(&self, alias: &str) -> StoreResult<(i64, EntityType)> {
        if alias.is_empty() {
            return Err(StoreError::not_found(AliasModel::TABLE, "<empty>"));
        }

        self.aliases_by_hash(alias)
            .await?
            .into_iter()
            .find(|row| row.name.as_str() == alias)
            .map(|row| (row.reference_id, row.reference_type))
            .ok_or_else(|| StoreError::not_found(AliasModel::TABLE, alias))
    }

    #[instrument(level = "debug", skip(self))]
    async fn set_alias(&self, reference_type: EntityType, id: i64, alias: &str) -> StoreResult<()> {
        if alias.is_empty() {
            return Ok(());
        }
        let candidate = AliasModel::new(reference_type, id, alias)?;

        if let Some(taken) = self.aliases_by_hash(alias).await?.into_iter().find(|row| {
            row.name.as_str() == alias && (row.reference_type, row.reference_id) != (reference_type, id)
        }) {
            return Err(StoreError::Conflict {
                table: AliasModel::TABLE,
                message: format!(
                    "alias '{alias}' is already bound to {} {}",
                    taken.reference_type, taken.reference_id
                ),
            });
        }

        // A concurrent writer can still claim the name; the unique
        // constraint on `name` reports that as a conflict.
        let query = sqlx::query(
            "INSERT INTO alias (reference_id, reference_type, name, name_hash) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (reference_id, reference_type) \
             DO UPDATE SET name = EXCLUDED.name, name_hash = EXCLUDED.name_hash",
        )
        .bind(candidate.reference_id)
        .bind(candidate.reference_type.as_str())
        .bind(candidate.name.as_str().to_string())
        .bind(candidate.name_hash);
        self.executor.execute(AliasModel::TABLE, query).await?;

        debug!(%reference_type, id, alias, "alias bound");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn alias_of(&self, reference_type: EntityType, id: i64) -> StoreResult<Option<String>> {
        let row = self
            .executor
            .fetch_optional(
                AliasModel::TABLE,
                sqlx::query("SELECT name FROM alias WHERE reference_type = $1 AND reference_id = $2")
                    .bind(reference_type.as_str())
                    .bind(id),
            )
            .await?;

        row.map(|row| row.try_get::<String, _>("name"))
            .transpose()
            .map_err(|e| map_sqlx_error(AliasModel::TABLE, e))
    }
}

#[cfg(test)]
mod tests {
    use notes_core_api::EntityType;
    use notes_core_db::{AliasStore, StoreError};
    use serial_test::serial;

    use super::super::test_utils::seed;
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_alias_lifecycle() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let seeded = seed(&ctx.store).await?;
        let acme = seeded.acme.id;

        ctx.store.set_alias(EntityType::Programs, acme, "acme-h1").await?;
        assert_eq!(ctx.store.resolve("acme-h1").await?, (acme, EntityType::Programs));
        assert_eq!(
            ctx.store.alias_of(EntityType::Programs, acme).await?.as_deref(),
            Some("acme-h1")
        );

        // rebinding replaces the pair's alias
        ctx.store.set_alias(EntityType::Programs, acme, "acme").await?;
        assert!(ctx.store.resolve("acme-h1").await.unwrap_err().is_not_found());
        assert_eq!(ctx.store.resolve("acme").await?, (acme, EntityType::Programs));

        // setting the same alias again is a no-op
        ctx.store.set_alias(EntityType::Programs, acme, "acme").await?;
        assert_eq!(ctx.store.alias_of(EntityType::Programs, acme).await?.as_deref(), Some("acme"));
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_alias_conflict_and_empty() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let seeded = seed(&ctx.store).await?;

        ctx.store.set_alias(EntityType::Programs, seeded.acme.id, "taken").await?;
        let err = ctx
            .store
            .set_alias(EntityType::Words, seeded.word.id, "taken")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { table: "alias", .. }));

        ctx.store.set_alias(EntityType::Words, seeded.word.id, "").await?;
        assert!(ctx.store.alias_of(EntityType::Words, seeded.word.id).await?.is_none());
        assert!(ctx.store.resolve("").await.unwrap_err().is_not_found());
        Ok(())
    }
}
