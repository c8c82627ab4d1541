use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use notes_core_api::EntityType;

use crate::error::StoreResult;
use crate::models::entity::{Entity, FieldChanges};
use crate::repository::{
    AliasStore, Create, Delete, FindWhere, First, KeyFilter, List, Page, PageRequest,
    Transactional, Updates,
};

use super::{KvCache, KvCacheExt};

/// Default lifetime of a cached alias resolution.
pub const DEFAULT_ALIAS_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct CachedTarget {
    id: i64,
    kind: EntityType,
}

/// Store wrapper that caches alias resolution in a [`KvCache`].
///
/// Every other operation goes straight to the wrapped store. Rebinding or
/// deleting through the wrapper drops the stale cache entries; writes made
/// inside a transaction bypass the cache and only ever add new aliases.
pub struct CachedAliasStore<S, C> {
    inner: Arc<S>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<S, C> CachedAliasStore<S, C>
where
    S: AliasStore,
    C: KvCache,
{
    pub fn new(inner: Arc<S>, cache: Arc<C>) -> Self {
        Self::with_ttl(inner, cache, DEFAULT_ALIAS_TTL)
    }

    pub fn with_ttl(inner: Arc<S>, cache: Arc<C>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    fn forward_key(alias: &str) -> String {
        format!("alias:{alias}")
    }

    fn reverse_key(kind: EntityType, id: i64) -> String {
        format!("alias-of:{kind}:{id}")
    }

    async fn remember(&self, alias: &str, kind: EntityType, id: i64) {
        let ttl = Some(self.ttl);
        let target = CachedTarget { id, kind };
        if let Err(err) = self.cache.set_object(&Self::forward_key(alias), &target, ttl).await {
            warn!(alias, error = %err, "failed to cache alias");
        }
        if let Err(err) = self.cache.set(&Self::reverse_key(kind, id), alias.to_string(), ttl).await {
            warn!(alias, error = %err, "failed to cache alias");
        }
    }

    async fn evict(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            warn!(key, error = %err, "failed to evict cached alias");
        }
    }

    /// Drop every cache entry about the alias of `(kind, id)`.
    async fn forget(&self, kind: EntityType, id: i64) {
        let reverse = Self::reverse_key(kind, id);
        match self.cache.get(&reverse).await {
            Ok(Some(alias)) => self.evict(&Self::forward_key(&alias)).await,
            Ok(None) => {}
            Err(err) => warn!(%kind, id, error = %err, "failed to read cached alias"),
        }
        self.evict(&reverse).await;
    }
}

#[async_trait]
impl<S, C> AliasStore for CachedAliasStore<S, C>
where
    S: AliasStore,
    C: KvCache,
{
    async fn resolve(&self, alias: &str) -> StoreResult<(i64, EntityType)> {
        match self.cache.get_object::<CachedTarget>(&Self::forward_key(alias)).await {
            Ok(Some(target)) => {
                debug!(alias, "alias cache hit");
                return Ok((target.id, target.kind));
            }
            Ok(None) => {}
            Err(err) => warn!(alias, error = %err, "alias cache unreadable, falling back to the store"),
        }

        let (id, kind) = self.inner.resolve(alias).await?;
        self.remember(alias, kind, id).await;
        Ok((id, kind))
    }

    async fn set_alias(&self, reference_type: EntityType, id: i64, alias: &str) -> StoreResult<()> {
        if alias.is_empty() {
            return self.inner.set_alias(reference_type, id, alias).await;
        }
        let previous = self.inner.alias_of(reference_type, id).await?;
        self.inner.set_alias(reference_type, id, alias).await?;

        self.forget(reference_type, id).await;
        if let Some(previous) = previous {
            self.evict(&Self::forward_key(&previous)).await;
        }
        self.remember(alias, reference_type, id).await;
        Ok(())
    }

    async fn alias_of(&self, reference_type: EntityType, id: i64) -> StoreResult<Option<String>> {
        if let Ok(Some(alias)) = self.cache.get(&Self::reverse_key(reference_type, id)).await {
            return Ok(Some(alias));
        }
        let alias = self.inner.alias_of(reference_type, id).await?;
        if let Some(alias) = &alias {
            self.remember(alias, reference_type, id).await;
        }
        Ok(alias)
    }
}

#[async_trait]
impl<E, S, C> FindWhere<E> for CachedAliasStore<S, C>
where
    E: Entity,
    S: FindWhere<E>,
    C: KvCache,
{
    async fn find_where(&self, filter: &KeyFilter) -> StoreResult<Vec<E>> {
        self.inner.find_where(filter).await
    }
}

#[async_trait]
impl<E, S, C> First<E> for CachedAliasStore<S, C>
where
    E: Entity,
    S: First<E>,
    C: KvCache,
{
    async fn first(&self, id: i64) -> StoreResult<E> {
        self.inner.first(id).await
    }
}

#[async_trait]
impl<E, S, C> Create<E> for CachedAliasStore<S, C>
where
    E: Entity,
    S: Create<E>,
    C: KvCache,
{
    async fn create(&self, entity: E) -> StoreResult<E> {
        self.inner.create(entity).await
    }
}

#[async_trait]
impl<E, S, C> Updates<E> for CachedAliasStore<S, C>
where
    E: Entity,
    S: Updates<E>,
    C: KvCache,
{
    async fn updates(&self, id: i64, changes: &FieldChanges) -> StoreResult<E> {
        self.inner.updates(id, changes).await
    }
}

#[async_trait]
impl<E, S, C> Delete<E> for CachedAliasStore<S, C>
where
    E: Entity,
    S: Delete<E> + AliasStore,
    C: KvCache,
{
    async fn delete(&self, id: i64) -> StoreResult<E> {
        let deleted = self.inner.delete(id).await?;
        if let Some(kind) = E::ENTITY_TYPE {
            self.forget(kind, id).await;
        }
        Ok(deleted)
    }
}

#[async_trait]
impl<E, S, C> List<E> for CachedAliasStore<S, C>
where
    E: Entity,
    S: List<E>,
    C: KvCache,
{
    async fn list(&self, page: PageRequest) -> StoreResult<Page<E>> {
        self.inner.list(page).await
    }
}

#[async_trait]
impl<S, C> Transactional for CachedAliasStore<S, C>
where
    S: Transactional,
    C: KvCache,
{
    type Tx = S::Tx;

    async fn begin(&self) -> StoreResult<S::Tx> {
        self.inner.begin().await
    }
}
