use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use super::error::LoadError;
use super::key::BatchKey;

/// Values of a settled batch, aligned with its keys.
pub(crate) type BatchOutcome<V> = Result<Vec<V>, LoadError>;

/// Keys collected for one execution of the batch function.
///
/// Keys are appended only while the batch is the loader's open batch.
/// Once sealed the key list is frozen and the batch executes at most once.
#[derive(Debug)]
pub(crate) struct Batch<K, V> {
    pub(crate) id: u64,
    keys: Mutex<Vec<K>>,
    sealed: AtomicBool,
    pub(crate) outcome: OnceCell<BatchOutcome<V>>,
}

impl<K: BatchKey, V> Batch<K, V> {
    fn new(id: u64) -> Self {
        Self {
            id,
            keys: Mutex::new(Vec::new()),
            sealed: AtomicBool::new(false),
            outcome: OnceCell::new(),
        }
    }

    /// Append a key, returning its position.
    fn push(&self, key: K) -> usize {
        let mut keys = self.keys.lock();
        keys.push(key);
        keys.len() - 1
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub(crate) fn keys(&self) -> Vec<K> {
        self.keys.lock().clone()
    }

    pub(crate) fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }
}

/// Where the result of one requested key will come from.
#[derive(Debug)]
pub(crate) enum Slot<K, V> {
    Pending { batch: Arc<Batch<K, V>>, index: usize },
    Ready(Result<V, LoadError>),
}

impl<K, V: Clone> Clone for Slot<K, V> {
    fn clone(&self) -> Self {
        match self {
            Slot::Pending { batch, index } => Slot::Pending {
                batch: batch.clone(),
                index: *index,
            },
            Slot::Ready(result) => Slot::Ready(result.clone()),
        }
    }
}

/// Mutable loader state, guarded by the loader's mutex.
#[derive(Debug)]
pub(crate) struct State<K, V> {
    pub(crate) open: Arc<Batch<K, V>>,
    pub(crate) cache: HashMap<K, Slot<K, V>>,
    batches: u64,
}

impl<K: BatchKey, V> State<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            open: Arc::new(Batch::new(1)),
            cache: HashMap::new(),
            batches: 1,
        }
    }

    /// Put `key` into the open batch.
    pub(crate) fn enqueue(&mut self, key: K, full: impl Fn(usize) -> bool) -> Slot<K, V> {
        if full(self.open.len()) {
            self.rotate();
        }
        let index = self.open.push(key);
        Slot::Pending {
            batch: self.open.clone(),
            index,
        }
    }

    /// Seal the open batch and start a fresh one.
    pub(crate) fn rotate(&mut self) -> Arc<Batch<K, V>> {
        self.batches += 1;
        let sealed = std::mem::replace(&mut self.open, Arc::new(Batch::new(self.batches)));
        sealed.seal();
        sealed
    }

    /// Seal `batch` if it is still the open one.
    pub(crate) fn seal(&mut self, batch: &Arc<Batch<K, V>>) {
        if Arc::ptr_eq(&self.open, batch) {
            self.rotate();
        }
    }
}

/// Result for position `index` of a settled batch.
pub(crate) fn pick<V: Clone>(outcome: &BatchOutcome<V>, index: usize) -> Result<V, LoadError> {
    match outcome {
        Ok(values) => values
            .get(index)
            .cloned()
            .ok_or(LoadError::BatchSizeMismatch {
                expected: index + 1,
                actual: values.len(),
            }),
        Err(err) => Err(err.clone()),
    }
}
