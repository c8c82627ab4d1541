use async_trait::async_trait;

use notes_core_api::EntityType;

use crate::error::StoreResult;

/// Alias lookup collaborator
///
/// Maps unique human-readable names to `(entity type, id)` pairs. Each pair
/// has at most one alias; binding a new alias to a pair replaces the old one.
#[async_trait]
pub trait AliasStore: Send + Sync {
    /// Resolve an alias to the entity it names
    ///
    /// # Returns
    /// * `Ok((id, type))` - The entity the alias is bound to
    /// * `Err(StoreError::NotFound)` - If no entity carries this alias
    async fn resolve(&self, alias: &str) -> StoreResult<(i64, EntityType)>;

    /// Bind `alias` to `(reference_type, id)`, creating or replacing its alias
    ///
    /// An empty alias is a no-op: nothing is written and `Ok(())` is returned.
    ///
    /// # Returns
    /// * `Err(StoreError::Conflict)` - If the alias is already bound to another entity
    async fn set_alias(&self, reference_type: EntityType, id: i64, alias: &str) -> StoreResult<()>;

    /// Current alias of `(reference_type, id)`, if any
    async fn alias_of(&self, reference_type: EntityType, id: i64) -> StoreResult<Option<String>>;
}
