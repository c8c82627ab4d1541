//! In-memory store.
//!
//! Rows are kept as JSON documents per table, in id order, which is the
//! store's natural return order. Every call is recorded so tests can assert
//! on the exact queries and writes a component issued, and reads or writes
//! can be made to fail on demand.

mod spy;

pub use spy::StoreCall;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::instrument;

use notes_core_api::EntityType;

use crate::error::{StoreError, StoreResult};
use crate::models::alias::{alias_name_hash, AliasModel};
use crate::models::entity::{Entity, FieldChanges};
use crate::repository::{
    AliasStore, Create, Delete, FindWhere, First, KeyFilter, List, Page, PageRequest,
    TransactionHandle, Transactional, Updates,
};
use spy::Spy;

#[derive(Debug, Clone, Default)]
struct Tables {
    rows: HashMap<&'static str, BTreeMap<i64, Value>>,
    next_ids: HashMap<&'static str, i64>,
    /// Rows written inside a transaction; `None` on the shared tables.
    touched: Option<BTreeSet<(&'static str, i64)>>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let next = self.next_ids.entry(table).or_insert(0);
        *next += 1;
        *next
    }

    fn touch(&mut self, table: &'static str, id: i64) {
        if let Some(touched) = self.touched.as_mut() {
            touched.insert((table, id));
        }
    }

    fn table(&mut self, table: &'static str) -> &mut BTreeMap<i64, Value> {
        self.rows.entry(table).or_default()
    }

    fn decoded<E: Entity>(&self) -> StoreResult<Vec<E>> {
        self.rows
            .get(E::TABLE)
            .map(|rows| rows.values().map(decode::<E>).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Debug, Default)]
struct Faults {
    failing_reads: Option<String>,
    failing_writes: Option<String>,
    reversed: bool,
}

/// In-memory implementation of every repository trait.
///
/// Clones share the same tables. Transaction handles work on a snapshot and
/// on commit replay only the rows they wrote onto the shared tables. Ids are
/// always drawn from the shared counter, so rows created inside and outside
/// a transaction never collide. Constraints are not re-checked on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    parent: Option<Arc<RwLock<Tables>>>,
    spy: Arc<Spy>,
    faults: Arc<RwLock<Faults>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.spy.calls()
    }

    pub fn clear_calls(&self) {
        self.spy.clear();
    }

    /// Number of mutating calls received so far.
    pub fn write_count(&self) -> usize {
        self.calls().iter().filter(|call| call.is_write()).count()
    }

    /// Filters of every batched lookup issued against `table`.
    pub fn find_where_calls(&self, table: &str) -> Vec<KeyFilter> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::FindWhere { table: t, filter } if t == table => Some(filter),
                _ => None,
            })
            .collect()
    }

    /// Make every read fail with a query error carrying `message`.
    pub fn fail_reads(&self, message: Option<&str>) {
        self.faults.write().failing_reads = message.map(str::to_string);
    }

    /// Make every write fail with a query error carrying `message`.
    pub fn fail_writes(&self, message: Option<&str>) {
        self.faults.write().failing_writes = message.map(str::to_string);
    }

    /// Return batched lookup rows in descending id order.
    pub fn reverse_rows(&self, reversed: bool) {
        self.faults.write().reversed = reversed;
    }

    /// Next id for `table`, reserved on the shared tables when inside a
    /// transaction. A rolled back transaction leaves a gap.
    fn allocate_id(&self, tables: &mut Tables, table: &'static str) -> i64 {
        match &self.parent {
            Some(parent) => parent.write().next_id(table),
            None => tables.next_id(table),
        }
    }

    fn record(&self, call: StoreCall) {
        self.spy.record(call);
    }

    fn check_reads(&self) -> StoreResult<()> {
        match &self.faults.read().failing_reads {
            Some(message) => Err(StoreError::Query {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_writes(&self) -> StoreResult<()> {
        match &self.faults.read().failing_writes {
            Some(message) => Err(StoreError::Query {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn encode<E: Entity>(entity: &E) -> StoreResult<Value> {
    serde_json::to_value(entity).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

fn decode<E: Entity>(value: &Value) -> StoreResult<E> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

fn check_column<E: Entity>(column: &str) -> StoreResult<()> {
    if E::has_column(column) {
        Ok(())
    } else {
        Err(StoreError::InvalidColumn {
            table: E::TABLE,
            column: column.to_string(),
        })
    }
}

#[async_trait]
impl<E: Entity> FindWhere<E> for MemoryStore {
    #[instrument(level = "debug", skip(self), fields(table = E::TABLE))]
    async fn find_where(&self, filter: &KeyFilter) -> StoreResult<Vec<E>> {
        self.record(StoreCall::FindWhere {
            table: E::TABLE,
            filter: filter.clone(),
        });
        self.check_reads()?;
        for column in filter.columns() {
            check_column::<E>(column)?;
        }

        let mut rows: Vec<E> = self
            .tables
            .read()
            .decoded::<E>()?
            .into_iter()
            .filter(|row| filter.matches(row))
            .collect();
        if self.faults.read().reversed {
            rows.reverse();
        }
        Ok(rows)
    }
}

#[async_trait]
impl<E: Entity> First<E> for MemoryStore {
    async fn first(&self, id: i64) -> StoreResult<E> {
        self.record(StoreCall::First { table: E::TABLE, id });
        self.check_reads()?;

        let tables = self.tables.read();
        let row = tables
            .rows
            .get(E::TABLE)
            .and_then(|rows| rows.get(&id))
            .ok_or_else(|| StoreError::not_found(E::TABLE, id))?;
        decode(row)
    }
}

#[async_trait]
impl<E: Entity> Create<E> for MemoryStore {
    async fn create(&self, mut entity: E) -> StoreResult<E> {
        self.record(StoreCall::Create { table: E::TABLE });
        self.check_writes()?;

        let mut tables = self.tables.write();
        let id = self.allocate_id(&mut tables, E::TABLE);
        entity.set_id(id);
        let row = encode(&entity)?;
        tables.table(E::TABLE).insert(id, row);
        tables.touch(E::TABLE, id);
        Ok(entity)
    }
}

#[async_trait]
impl<E: Entity> Updates<E> for MemoryStore {
    async fn updates(&self, id: i64, changes: &FieldChanges) -> StoreResult<E> {
        self.record(StoreCall::Updates {
            table: E::TABLE,
            id,
            columns: changes.keys().copied().collect(),
        });
        self.check_writes()?;
        for column in changes.keys() {
            check_column::<E>(column)?;
        }

        let mut tables = self.tables.write();
        let rows = tables.table(E::TABLE);
        let stored = rows
            .get(&id)
            .ok_or_else(|| StoreError::not_found(E::TABLE, id))?;
        let mut entity: E = decode(stored)?;
        entity.apply(changes)?;
        rows.insert(id, encode(&entity)?);
        tables.touch(E::TABLE, id);
        Ok(entity)
    }
}

#[async_trait]
impl<E: Entity> Delete<E> for MemoryStore {
    async fn delete(&self, id: i64) -> StoreResult<E> {
        self.record(StoreCall::Delete { table: E::TABLE, id });
        self.check_writes()?;

        let mut tables = self.tables.write();
        let removed = tables
            .table(E::TABLE)
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(E::TABLE, id))?;
        tables.touch(E::TABLE, id);
        decode(&removed)
    }
}

#[async_trait]
impl<E: Entity> List<E> for MemoryStore {
    async fn list(&self, page: PageRequest) -> StoreResult<Page<E>> {
        self.record(StoreCall::List { table: E::TABLE });
        self.check_reads()?;

        let rows = self.tables.read().decoded::<E>()?;
        let total = rows.len();
        let items = rows
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        Ok(Page::new(items, total, page))
    }
}

#[async_trait]
impl AliasStore for MemoryStore {
    async fn resolve(&self, alias: &str) -> StoreResult<(i64, EntityType)> {
        self.record(StoreCall::Resolve {
            alias: alias.to_string(),
        });
        self.check_reads()?;
        if alias.is_empty() {
            return Err(StoreError::not_found(AliasModel::TABLE, "<empty>"));
        }

        let name_hash = alias_name_hash(alias)?;
        self.tables
            .read()
            .decoded::<AliasModel>()?
            .into_iter()
            .find(|row| row.name_hash == name_hash && row.name.as_str() == alias)
            .map(|row| (row.reference_id, row.reference_type))
            .ok_or_else(|| StoreError::not_found(AliasModel::TABLE, alias))
    }

    async fn set_alias(&self, reference_type: EntityType, id: i64, alias: &str) -> StoreResult<()> {
        if alias.is_empty() {
            return Ok(());
        }
        self.record(StoreCall::SetAlias {
            reference_type,
            id,
            alias: alias.to_string(),
        });
        self.check_writes()?;

        let mut candidate = AliasModel::new(reference_type, id, alias)?;
        let mut tables = self.tables.write();
        let existing = tables.decoded::<AliasModel>()?;

        if let Some(taken) = existing.iter().find(|row| {
            row.name.as_str() == alias && (row.reference_type, row.reference_id) != (reference_type, id)
        }) {
            return Err(StoreError::Conflict {
                table: AliasModel::TABLE,
                message: format!(
                    "alias '{alias}' is already bound to {} {}",
                    taken.reference_type, taken.reference_id
                ),
            });
        }

        let row_id = match existing
            .iter()
            .find(|row| (row.reference_type, row.reference_id) == (reference_type, id))
        {
            Some(current) => current.id,
            None => self.allocate_id(&mut tables, AliasModel::TABLE),
        };
        candidate.id = row_id;
        let row = encode(&candidate)?;
        tables.table(AliasModel::TABLE).insert(row_id, row);
        tables.touch(AliasModel::TABLE, row_id);
        Ok(())
    }

    async fn alias_of(&self, reference_type: EntityType, id: i64) -> StoreResult<Option<String>> {
        self.record(StoreCall::AliasOf { reference_type, id });
        self.check_reads()?;

        Ok(self
            .tables
            .read()
            .decoded::<AliasModel>()?
            .into_iter()
            .find(|row| (row.reference_type, row.reference_id) == (reference_type, id))
            .map(|row| row.name.as_str().to_string()))
    }
}

#[async_trait]
impl Transactional for MemoryStore {
    type Tx = MemoryStore;

    async fn begin(&self) -> StoreResult<MemoryStore> {
        if self.parent.is_some() {
            return Err(StoreError::Transaction {
                message: "nested transactions are not supported".to_string(),
            });
        }
        self.record(StoreCall::Begin);

        let mut snapshot = self.tables.read().clone();
        snapshot.touched = Some(BTreeSet::new());
        Ok(MemoryStore {
            tables: Arc::new(RwLock::new(snapshot)),
            parent: Some(self.tables.clone()),
            spy: self.spy.clone(),
            faults: self.faults.clone(),
        })
    }
}

#[async_trait]
impl TransactionHandle for MemoryStore {
    async fn commit(self) -> StoreResult<()> {
        let parent = self.parent.as_ref().ok_or_else(|| StoreError::Transaction {
            message: "commit outside of a transaction".to_string(),
        })?;
        self.record(StoreCall::Commit);

        let staged = self.tables.read();
        let mut shared = parent.write();
        for &(table, id) in staged.touched.iter().flatten() {
            match staged.rows.get(table).and_then(|rows| rows.get(&id)) {
                Some(row) => {
                    shared.table(table).insert(id, row.clone());
                }
                None => {
                    shared.table(table).remove(&id);
                }
            }
        }
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        if self.parent.is_none() {
            return Err(StoreError::Transaction {
                message: "rollback outside of a transaction".to_string(),
            });
        }
        self.record(StoreCall::Rollback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, TagModel};
    use chrono::Utc;
    use heapless::String as HeaplessString;

    fn tag(name: &str) -> TagModel {
        TagModel {
            id: 0,
            name: HeaplessString::try_from(name).unwrap(),
            color: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_first_loads() -> StoreResult<()> {
        let store = MemoryStore::new();
        let a = store.create(tag("xss")).await?;
        let b = store.create(tag("sqli")).await?;
        assert_eq!((a.id, b.id), (1, 2));

        let loaded: TagModel = store.first(2).await?;
        assert_eq!(loaded.name.as_str(), "sqli");

        let missing: StoreResult<TagModel> = store.first(42).await;
        assert!(missing.unwrap_err().is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_updates_only_touch_given_columns() -> StoreResult<()> {
        let store = MemoryStore::new();
        let created = store.create(tag("xss")).await?;

        let mut changes = FieldChanges::new();
        changes.insert("color", FieldValue::from("red"));
        let updated: TagModel = store.updates(created.id, &changes).await?;

        assert_eq!(updated.name.as_str(), "xss");
        assert_eq!(updated.color.as_ref().map(|c| c.as_str()), Some("red"));
        assert_eq!(updated.created_at, created.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_column_is_rejected() -> StoreResult<()> {
        let store = MemoryStore::new();
        let created = store.create(tag("xss")).await?;

        let mut changes = FieldChanges::new();
        changes.insert("owner", FieldValue::from("me"));
        let result: StoreResult<TagModel> = store.updates(created.id, &changes).await;
        assert!(matches!(result, Err(StoreError::InvalidColumn { .. })));

        let filter = KeyFilter::int("owner_id", [1]);
        let result: StoreResult<Vec<TagModel>> = store.find_where(&filter).await;
        assert!(matches!(result, Err(StoreError::InvalidColumn { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_find_where_and_reversed_order() -> StoreResult<()> {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.create(tag(name)).await?;
        }
        let filter = KeyFilter::int("id", [3, 1]);

        let rows: Vec<TagModel> = store.find_where(&filter).await?;
        assert_eq!(rows.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);

        store.reverse_rows(true);
        let rows: Vec<TagModel> = store.find_where(&filter).await?;
        assert_eq!(rows.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 1]);

        assert_eq!(store.find_where_calls("tag").len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_pages_by_id() -> StoreResult<()> {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.create(tag(&format!("t{i}"))).await?;
        }
        let page: Page<TagModel> = store.list(PageRequest::new(2, 2)).await?;
        assert_eq!(page.total, 5);
        assert_eq!(page.items.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);
        assert!(page.has_more());
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_reads() {
        let store = MemoryStore::new();
        store.fail_reads(Some("connection reset"));
        let result: StoreResult<Vec<TagModel>> = store.find_where(&KeyFilter::int("id", [1])).await;
        assert!(matches!(result, Err(StoreError::Query { message }) if message == "connection reset"));
    }

    #[tokio::test]
    async fn test_alias_lifecycle() -> StoreResult<()> {
        let store = MemoryStore::new();
        store.set_alias(EntityType::Programs, 5, "acme").await?;
        assert_eq!(store.resolve("acme").await?, (5, EntityType::Programs));

        // rebinding replaces the old name
        store.set_alias(EntityType::Programs, 5, "acme-corp").await?;
        assert!(store.resolve("acme").await.unwrap_err().is_not_found());
        assert_eq!(store.alias_of(EntityType::Programs, 5).await?, Some("acme-corp".to_string()));

        let taken = store.set_alias(EntityType::Words, 1, "acme-corp").await;
        assert!(matches!(taken, Err(StoreError::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_alias_is_a_no_op() -> StoreResult<()> {
        let store = MemoryStore::new();
        store.set_alias(EntityType::Programs, 5, "").await?;

        assert_eq!(store.write_count(), 0);
        assert!(store.resolve("").await.unwrap_err().is_not_found());
        assert_eq!(store.alias_of(EntityType::Programs, 5).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_transaction_commit_and_rollback() -> StoreResult<()> {
        let store = MemoryStore::new();

        let tx = store.begin().await?;
        let created = tx.create(tag("committed")).await?;
        tx.commit().await?;
        let loaded: TagModel = store.first(created.id).await?;
        assert_eq!(loaded.name.as_str(), "committed");

        let tx = store.begin().await?;
        let dropped = tx.create(tag("dropped")).await?;
        drop(tx);
        let missing: StoreResult<TagModel> = store.first(dropped.id).await;
        assert!(missing.unwrap_err().is_not_found());

        let tx = store.begin().await?;
        tokio_test::assert_err!(tx.begin().await);
        tx.rollback().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_keeps_writes_made_outside_the_transaction() -> StoreResult<()> {
        let store = MemoryStore::new();
        let doomed = store.create(tag("doomed")).await?;

        let tx = store.begin().await?;
        let outside = store.create(tag("outside")).await?;
        let inside = tx.create(tag("inside")).await?;
        let _: TagModel = tx.delete(doomed.id).await?;
        assert_ne!(outside.id, inside.id);
        tx.commit().await?;

        let outside_row: TagModel = store.first(outside.id).await?;
        let inside_row: TagModel = store.first(inside.id).await?;
        assert_eq!(outside_row.name.as_str(), "outside");
        assert_eq!(inside_row.name.as_str(), "inside");
        let removed: StoreResult<TagModel> = store.first(doomed.id).await;
        assert!(removed.unwrap_err().is_not_found());

        let next = store.create(tag("next")).await?;
        assert!(next.id > inside.id);
        Ok(())
    }
}
