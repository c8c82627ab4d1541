use async_trait::async_trait;

use crate::models::entity::{Entity, FieldChanges};

use super::error::CrudResult;

/// Per-entity behaviour plugged into [`GenericCrud`](super::GenericCrud).
///
/// The validators receive the store so they can check uniqueness or
/// dependent rows. Both accept everything unless overridden.
#[async_trait]
pub trait CrudHooks<S>: Send + Sync
where
    S: Send + Sync,
{
    type Input: Send + Sync;
    type Entity: Entity;

    /// Build a new, not yet persisted entity from `input`.
    fn transform(&self, input: &Self::Input) -> CrudResult<Self::Entity>;

    /// Columns of `existing` that `input` changes. Columns absent from the
    /// result are left untouched.
    fn compute_updates(&self, existing: &Self::Entity, input: &Self::Input) -> CrudResult<FieldChanges>;

    /// Checked before create (`id == 0`) and update.
    async fn validate_write(&self, _store: &S, _input: &Self::Input, _id: i64) -> CrudResult<()> {
        Ok(())
    }

    /// Checked before delete.
    async fn validate_delete(&self, _store: &S, _entity: &Self::Entity) -> CrudResult<()> {
        Ok(())
    }
}
