use async_trait::async_trait;
use tracing::{debug, instrument};

use notes_core_db::{FieldChanges, StoreError, StoreResult, Updates};

use super::store::{check_column, PgEntity, PostgresStore};
use crate::utils::{bind_value, decode_row};

impl PostgresStore {
    pub(super) async fn updates_impl<E: PgEntity>(&self, id: i64, changes: &FieldChanges) -> StoreResult<E> {
        if changes.is_empty() {
            return self.first_impl(id).await;
        }
        for column in changes.keys() {
            if *column == "id" {
                return Err(StoreError::InvalidColumn {
                    table: E::TABLE,
                    column: "id".to_string(),
                });
            }
            check_column::<E>(column)?;
        }

        let assignments = changes
            .keys()
            .enumerate()
            .map(|(index, column)| format!("{column} = ${}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ${} RETURNING *",
            E::TABLE,
            changes.len() + 1
        );

        let mut query = sqlx::query(&sql);
        for value in changes.values() {
            query = bind_value(query, value.clone());
        }
        let row = self
            .executor
            .fetch_optional(E::TABLE, query.bind(id))
            .await?
            .ok_or_else(|| StoreError::not_found(E::TABLE, id))?;

        debug!(table = E::TABLE, id, columns = changes.len(), "row updated");
        decode_row(&row)
    }
}

#[async_trait]
impl<E: PgEntity> Updates<E> for PostgresStore {
    #[instrument(level = "debug", skip(self))]
    async fn updates(&self, id: i64, changes: &FieldChanges) -> StoreResult<E> {
        self.updates_impl(id, changes).await
    }
}

#[cfg(test)]
mod tests {
    use notes_core_db::{FieldChanges, FieldValue, First, ProgramModel, StoreError, TaskModel, Updates};
    use serial_test::serial;

    use super::super::test_utils::seed;
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_updates_only_touches_given_columns() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let seeded = seed(&ctx.store).await?;

        let mut changes = FieldChanges::new();
        changes.insert("scope", FieldValue::from("*.acme.com"));
        changes.insert("url", FieldValue::Text(None));
        let updated: ProgramModel = ctx.store.updates(seeded.acme.id, &changes).await?;

        assert_eq!(updated.scope.as_deref(), Some("*.acme.com"));
        assert!(updated.url.is_none());
        assert_eq!(updated.name, seeded.acme.name);
        assert_eq!(updated.description, seeded.acme.description);

        let reloaded: ProgramModel = ctx.store.first(seeded.acme.id).await?;
        assert_eq!(reloaded, updated);
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_updates_binds_typed_nulls() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let seeded = seed(&ctx.store).await?;

        let mut changes = FieldChanges::new();
        changes.insert("project_id", FieldValue::Int(None));
        changes.insert("due_at", FieldValue::Timestamp(None));
        let detached: TaskModel = ctx.store.updates(seeded.task.id, &changes).await?;

        assert!(detached.project_id.is_none());
        assert!(detached.due_at.is_none());
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_updates_missing_row_and_bad_column() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;

        let mut changes = FieldChanges::new();
        changes.insert("scope", FieldValue::from("x"));
        let missing: Result<ProgramModel, _> = ctx.store.updates(i64::MAX, &changes).await;
        assert!(missing.unwrap_err().is_not_found());

        let mut bad = FieldChanges::new();
        bad.insert("color", FieldValue::from("red"));
        let rejected: Result<ProgramModel, _> = ctx.store.updates(1, &bad).await;
        assert!(matches!(rejected, Err(StoreError::InvalidColumn { .. })));
        Ok(())
    }
}
