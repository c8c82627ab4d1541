use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::entity::Entity;

/// Generic repository trait for deleting one entity by id
#[async_trait]
pub trait Delete<E: Entity>: Send + Sync {
    /// Remove the row with the given id
    ///
    /// # Returns
    /// * `Ok(E)` - The removed row's last state
    /// * `Err(StoreError::NotFound)` - If no row has this id
    async fn delete(&self, id: i64) -> StoreResult<E>;
}
