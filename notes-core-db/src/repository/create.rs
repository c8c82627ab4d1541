use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::entity::Entity;

/// Generic repository trait for persisting a new entity
///
/// The id of the given entity is ignored; the store generates it.
#[async_trait]
pub trait Create<E: Entity>: Send + Sync {
    /// Insert one entity
    ///
    /// # Returns
    /// * `Ok(E)` - The persisted entity with its generated id populated
    /// * `Err(StoreError::Conflict)` - If a uniqueness constraint rejected the row
    /// * `Err` - Any other error if the insert failed
    async fn create(&self, entity: E) -> StoreResult<E>;
}
