use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use crate::repository::KeyFilter;

/// Anything a loader can be keyed by.
pub trait BatchKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> BatchKey for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// A key that maps onto stored columns.
pub trait StoreKey: BatchKey {
    /// Column(s) the key is compared against.
    type Column: Copy + Debug + Send + Sync + 'static;

    /// "column IN (keys)" for a batch of keys.
    fn filter(column: Self::Column, keys: &[Self]) -> KeyFilter;
}

impl StoreKey for i64 {
    type Column = &'static str;

    fn filter(column: &'static str, keys: &[Self]) -> KeyFilter {
        KeyFilter::int(column, keys.iter().copied())
    }
}

impl StoreKey for String {
    type Column = &'static str;

    fn filter(column: &'static str, keys: &[Self]) -> KeyFilter {
        KeyFilter::text(column, keys.iter().cloned())
    }
}

/// Compound key of polymorphic references (taggings, aliases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceKey {
    pub id: i64,
    pub kind: EntityType,
}

impl ReferenceKey {
    pub fn new(kind: EntityType, id: i64) -> Self {
        Self { id, kind }
    }
}

impl StoreKey for ReferenceKey {
    /// (id column, type column)
    type Column = (&'static str, &'static str);

    fn filter((id_column, type_column): Self::Column, keys: &[Self]) -> KeyFilter {
        KeyFilter::reference(id_column, type_column, keys.iter().map(|key| (key.id, key.kind)))
    }
}
