use async_trait::async_trait;

use crate::error::StoreResult;

/// Fetches the values of one batch of keys.
///
/// The result must have exactly one entry per key, `result[i]` belonging to
/// `keys[i]`. Keys absent from the store map to the value type's "missing"
/// form (`None`, an empty `Vec`), never to an error. A failure fails the
/// whole batch.
#[async_trait]
pub trait BatchFn<K, V>: Send + Sync + 'static {
    async fn load(&self, keys: &[K]) -> StoreResult<Vec<V>>;
}
