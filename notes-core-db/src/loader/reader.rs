//! Batch functions reading from a store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::entity::Entity;
use crate::models::{TagModel, TaggingModel};
use crate::repository::{FindWhere, KeyFilter};

use super::batch_fn::BatchFn;
use super::eager::EagerLoad;
use super::key::{ReferenceKey, StoreKey};

type Preloads<S, E> = Vec<Arc<dyn EagerLoad<S, E>>>;

/// One row per key: `Some(row)` or `None` when the key has no row.
pub struct EntityReader<S, E, K: StoreKey> {
    store: Arc<S>,
    column: K::Column,
    key_of: fn(&E) -> Option<K>,
    preloads: Preloads<S, E>,
}

impl<S, E, K> EntityReader<S, E, K>
where
    S: FindWhere<E> + 'static,
    E: Entity,
    K: StoreKey,
{
    pub fn new(store: Arc<S>, column: K::Column, key_of: fn(&E) -> Option<K>) -> Self {
        Self {
            store,
            column,
            key_of,
            preloads: Vec::new(),
        }
    }

    pub fn with(mut self, preload: impl EagerLoad<S, E> + 'static) -> Self {
        self.preloads.push(Arc::new(preload));
        self
    }
}

impl<S, E> EntityReader<S, E, i64>
where
    S: FindWhere<E> + 'static,
    E: Entity,
{
    /// Reader keyed by primary key.
    pub fn by_id(store: Arc<S>) -> Self {
        Self::new(store, "id", |row| Some(row.get_id()))
    }
}

#[async_trait]
impl<S, E, K> BatchFn<K, Option<E>> for EntityReader<S, E, K>
where
    S: FindWhere<E> + 'static,
    E: Entity,
    K: StoreKey,
{
    async fn load(&self, keys: &[K]) -> StoreResult<Vec<Option<E>>> {
        let filter = K::filter(self.column, keys);
        let mut rows = self.store.find_where(&filter).await?;
        for preload in &self.preloads {
            preload.apply(&*self.store, &mut rows).await?;
        }

        let by_key: HashMap<K, E> = rows
            .into_iter()
            .filter_map(|row| (self.key_of)(&row).map(|key| (key, row)))
            .collect();
        Ok(keys.iter().map(|key| by_key.get(key).cloned()).collect())
    }
}

/// All rows per key, an empty `Vec` when the key has none.
pub struct RelationReader<S, E, K: StoreKey> {
    store: Arc<S>,
    column: K::Column,
    key_of: fn(&E) -> Option<K>,
    order: Option<fn(&E, &E) -> Ordering>,
    preloads: Preloads<S, E>,
}

impl<S, E, K> RelationReader<S, E, K>
where
    S: FindWhere<E> + 'static,
    E: Entity,
    K: StoreKey,
{
    pub fn new(store: Arc<S>, column: K::Column, key_of: fn(&E) -> Option<K>) -> Self {
        Self {
            store,
            column,
            key_of,
            order: None,
            preloads: Vec::new(),
        }
    }

    /// Order rows within each key. Without it rows keep the store's order.
    pub fn ordered_by(mut self, order: fn(&E, &E) -> Ordering) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with(mut self, preload: impl EagerLoad<S, E> + 'static) -> Self {
        self.preloads.push(Arc::new(preload));
        self
    }
}

#[async_trait]
impl<S, E, K> BatchFn<K, Vec<E>> for RelationReader<S, E, K>
where
    S: FindWhere<E> + 'static,
    E: Entity,
    K: StoreKey,
{
    async fn load(&self, keys: &[K]) -> StoreResult<Vec<Vec<E>>> {
        let filter = K::filter(self.column, keys);
        let mut rows = self.store.find_where(&filter).await?;
        for preload in &self.preloads {
            preload.apply(&*self.store, &mut rows).await?;
        }

        let mut grouped: HashMap<K, Vec<E>> = HashMap::new();
        for row in rows {
            if let Some(key) = (self.key_of)(&row) {
                grouped.entry(key).or_default().push(row);
            }
        }
        if let Some(order) = self.order {
            for rows in grouped.values_mut() {
                rows.sort_by(order);
            }
        }
        Ok(keys
            .iter()
            .map(|key| grouped.get(key).cloned().unwrap_or_default())
            .collect())
    }
}

/// Tags attached to polymorphic references, through the tagging table.
///
/// Two queries, taggings then tags, for the whole batch.
pub struct TagsByReferenceReader<S> {
    store: Arc<S>,
}

impl<S> TagsByReferenceReader<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> BatchFn<ReferenceKey, Vec<TagModel>> for TagsByReferenceReader<S>
where
    S: FindWhere<TaggingModel> + FindWhere<TagModel> + 'static,
{
    async fn load(&self, keys: &[ReferenceKey]) -> StoreResult<Vec<Vec<TagModel>>> {
        let filter = ReferenceKey::filter(("reference_id", "reference_type"), keys);
        let taggings = FindWhere::<TaggingModel>::find_where(&*self.store, &filter).await?;
        if taggings.is_empty() {
            return Ok(vec![Vec::new(); keys.len()]);
        }

        let tag_filter = KeyFilter::int("id", taggings.iter().map(|tagging| tagging.tag_id));
        let tags: HashMap<i64, TagModel> = FindWhere::<TagModel>::find_where(&*self.store, &tag_filter)
            .await?
            .into_iter()
            .map(|tag| (tag.id, tag))
            .collect();

        let mut grouped: HashMap<ReferenceKey, Vec<TagModel>> = HashMap::new();
        for tagging in &taggings {
            if let Some(tag) = tags.get(&tagging.tag_id) {
                grouped
                    .entry(ReferenceKey::new(tagging.reference_type, tagging.reference_id))
                    .or_default()
                    .push(tag.clone());
            }
        }
        Ok(keys
            .iter()
            .map(|key| grouped.get(key).cloned().unwrap_or_default())
            .collect())
    }
}
