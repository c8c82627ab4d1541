use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::entity::{Entity, FieldChanges};

/// Generic repository trait for partial updates
///
/// Only the columns present in `changes` are written; every other column
/// keeps its stored value.
#[async_trait]
pub trait Updates<E: Entity>: Send + Sync {
    /// Apply `changes` to the row with the given id
    ///
    /// # Returns
    /// * `Ok(E)` - The row after the update
    /// * `Err(StoreError::NotFound)` - If no row has this id
    /// * `Err` - Any other error if the update failed
    async fn updates(&self, id: i64, changes: &FieldChanges) -> StoreResult<E>;
}
