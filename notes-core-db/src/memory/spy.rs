use parking_lot::Mutex;

use notes_core_api::EntityType;

use crate::repository::key_filter::KeyFilter;

/// One operation received by a `MemoryStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    FindWhere { table: &'static str, filter: KeyFilter },
    First { table: &'static str, id: i64 },
    Create { table: &'static str },
    Updates { table: &'static str, id: i64, columns: Vec<&'static str> },
    Delete { table: &'static str, id: i64 },
    List { table: &'static str },
    Resolve { alias: String },
    SetAlias { reference_type: EntityType, id: i64, alias: String },
    AliasOf { reference_type: EntityType, id: i64 },
    Begin,
    Commit,
    Rollback,
}

impl StoreCall {
    /// Whether the call mutates stored rows.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreCall::Create { .. }
                | StoreCall::Updates { .. }
                | StoreCall::Delete { .. }
                | StoreCall::SetAlias { .. }
        )
    }
}

/// Call log shared by a store and its transaction handles.
#[derive(Debug, Default)]
pub(crate) struct Spy {
    calls: Mutex<Vec<StoreCall>>,
}

impl Spy {
    pub(crate) fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().clear();
    }
}
