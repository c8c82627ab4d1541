use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::entity::Entity;

/// Generic repository trait for loading one entity by its id
#[async_trait]
pub trait First<E: Entity>: Send + Sync {
    /// Load an entity by its unique identifier
    ///
    /// # Returns
    /// * `Ok(E)` - The loaded entity
    /// * `Err(StoreError::NotFound)` - If no row has this id
    /// * `Err` - Any other error if the query could not be executed
    async fn first(&self, id: i64) -> StoreResult<E>;
}
