use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::entity::Entity;
use crate::repository::{FindWhere, KeyFilter};

/// Related rows fetched alongside a batch of parent rows.
///
/// Applied once per batch: one follow-up query for every parent row of the
/// batch, never one query per parent.
#[async_trait]
pub trait EagerLoad<S, P>: Send + Sync {
    /// Name of the relation, e.g. `"endpoints"`.
    fn path(&self) -> &'static str;

    async fn apply(&self, store: &S, parents: &mut [P]) -> StoreResult<()>;
}

/// One-to-many preload: children whose `foreign_key` column holds a
/// parent's key.
pub struct HasMany<P, C> {
    pub path: &'static str,
    pub foreign_key: &'static str,
    pub parent_key: fn(&P) -> i64,
    pub child_key: fn(&C) -> Option<i64>,
    pub attach: fn(&mut P, Vec<C>),
}

impl<P, C> fmt::Debug for HasMany<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HasMany")
            .field("path", &self.path)
            .field("foreign_key", &self.foreign_key)
            .finish()
    }
}

#[async_trait]
impl<S, P, C> EagerLoad<S, P> for HasMany<P, C>
where
    S: FindWhere<C>,
    P: Entity,
    C: Entity,
{
    fn path(&self) -> &'static str {
        self.path
    }

    async fn apply(&self, store: &S, parents: &mut [P]) -> StoreResult<()> {
        if parents.is_empty() {
            return Ok(());
        }
        let filter = KeyFilter::int(self.foreign_key, parents.iter().map(self.parent_key));
        let children = store.find_where(&filter).await?;

        let mut grouped: HashMap<i64, Vec<C>> = HashMap::new();
        for child in children {
            if let Some(key) = (self.child_key)(&child) {
                grouped.entry(key).or_default().push(child);
            }
        }
        for parent in parents.iter_mut() {
            let key = (self.parent_key)(parent);
            (self.attach)(parent, grouped.get(&key).cloned().unwrap_or_default());
        }
        Ok(())
    }
}
