use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::entity::Entity;
use crate::repository::key_filter::KeyFilter;

/// Generic repository trait for batched lookups by natural or foreign key
///
/// This is the one query a batch executor issues: select every row whose
/// key column(s) match any of the filter's values.
///
/// # Type Parameters
/// * `E` - The entity type that must implement Entity trait
///
/// # Example
/// ```ignore
/// let filter = KeyFilter::int("program_id", [1, 2, 3]);
/// let endpoints: Vec<EndpointModel> = store.find_where(&filter).await?;
/// ```
#[async_trait]
pub trait FindWhere<E: Entity>: Send + Sync {
    /// Find all rows selected by `filter`
    ///
    /// # Arguments
    /// * `filter` - The key column(s) and the set of keys to match
    ///
    /// # Returns
    /// * `Ok(Vec<E>)` - Matching rows in the store's natural order (keys without rows are simply absent)
    /// * `Err` - An error if the query could not be executed
    async fn find_where(&self, filter: &KeyFilter) -> StoreResult<Vec<E>>;
}
