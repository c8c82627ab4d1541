use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, debug_span, warn, Instrument};

use super::batch::{pick, Batch, BatchOutcome, Slot, State};
use super::batch_fn::BatchFn;
use super::config::LoaderConfig;
use super::error::LoadError;
use super::key::BatchKey;
use super::scope::RequestScope;

/// Request-scoped batching loader for one entity or relation.
///
/// `request` enqueues a key without I/O. Awaiting the returned handle opens
/// a short collection window, after which the first waiter seals the batch
/// and runs the batch function once for every key collected so far; all
/// other waiters of that batch receive their slice of the same outcome.
///
/// With caching enabled a key is enqueued at most once for the lifetime of
/// the loader and every later request of it shares the first result.
pub struct Loader<K, V> {
    inner: Arc<Inner<K, V>>,
}

struct Inner<K, V> {
    name: &'static str,
    batch_fn: Arc<dyn BatchFn<K, V>>,
    config: LoaderConfig,
    scope: RequestScope,
    state: Mutex<State<K, V>>,
}

impl<K, V> Clone for Loader<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Loader<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("name", &self.inner.name)
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Handle to the eventual result of one requested key.
pub struct Pending<K, V> {
    loader: Loader<K, V>,
    slot: Slot<K, V>,
}

impl<K, V> Loader<K, V>
where
    K: BatchKey,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        name: &'static str,
        batch_fn: Arc<dyn BatchFn<K, V>>,
        config: LoaderConfig,
        scope: RequestScope,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                batch_fn,
                config,
                scope,
                state: Mutex::new(State::new()),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Enqueue `key` into the open batch, or reuse its cached slot.
    pub fn request(&self, key: K) -> Pending<K, V> {
        let config = self.inner.config;
        let mut state = self.inner.state.lock();

        if config.cache {
            if let Some(slot) = state.cache.get(&key) {
                return Pending {
                    loader: self.clone(),
                    slot: slot.clone(),
                };
            }
        }

        let slot = state.enqueue(key.clone(), |len| config.batch_is_full(len));
        if config.cache {
            state.cache.insert(key, slot.clone());
        }
        drop(state);

        Pending {
            loader: self.clone(),
            slot,
        }
    }

    pub async fn load(&self, key: K) -> Result<V, LoadError> {
        self.request(key).wait().await
    }

    /// Load several keys in one batch. One key's failure does not affect
    /// the others' results.
    pub async fn load_many(&self, keys: impl IntoIterator<Item = K>) -> Vec<Result<V, LoadError>> {
        let pending: Vec<_> = keys.into_iter().map(|key| self.request(key)).collect();
        let mut results = Vec::with_capacity(pending.len());
        for handle in pending {
            results.push(handle.wait().await);
        }
        results
    }

    /// Seal and execute the open batch now, without a collection window.
    pub async fn dispatch(&self) -> Result<(), LoadError> {
        let batch = {
            let mut state = self.inner.state.lock();
            if state.open.len() == 0 {
                return Ok(());
            }
            state.rotate()
        };
        if self.inner.scope.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        tokio::select! {
            biased;
            outcome = self.inner.settle(&batch) => outcome.as_ref().map(|_| ()).map_err(Clone::clone),
            _ = self.inner.scope.cancelled() => Err(LoadError::Cancelled),
        }
    }

    /// Seed the cache with a settled value. An already cached key keeps its
    /// value; `clear` it first to replace it. Returns whether the value was
    /// stored.
    pub fn prime(&self, key: K, value: V) -> bool {
        if !self.inner.config.cache {
            return false;
        }
        let mut state = self.inner.state.lock();
        if state.cache.contains_key(&key) {
            return false;
        }
        state.cache.insert(key, Slot::Ready(Ok(value)));
        true
    }

    /// Forget `key`; the next request fetches it again.
    pub fn clear(&self, key: &K) {
        self.inner.state.lock().cache.remove(key);
    }

    pub fn clear_all(&self) {
        self.inner.state.lock().cache.clear();
    }
}

impl<K, V> Inner<K, V>
where
    K: BatchKey,
    V: Clone + Send + Sync + 'static,
{
    async fn collection_window(&self) {
        if self.config.wait.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.config.wait).await;
        }
    }

    /// Outcome of `batch`, executing it if no one has yet.
    async fn settle<'a>(&self, batch: &'a Arc<Batch<K, V>>) -> &'a BatchOutcome<V> {
        batch.outcome.get_or_init(|| self.execute(batch)).await
    }

    async fn execute(&self, batch: &Arc<Batch<K, V>>) -> BatchOutcome<V> {
        self.state.lock().seal(batch);
        let keys = batch.keys();
        let span = debug_span!(parent: self.scope.span(), "batch", loader = self.name, batch = batch.id);
        debug!(parent: &span, loader = self.name, batch = batch.id, keys = keys.len(), "dispatching batch");

        match self.batch_fn.load(&keys).instrument(span).await {
            Ok(values) if values.len() == keys.len() => Ok(values),
            Ok(values) => {
                warn!(
                    loader = self.name,
                    batch = batch.id,
                    expected = keys.len(),
                    actual = values.len(),
                    "batch function returned the wrong number of results"
                );
                Err(LoadError::BatchSizeMismatch {
                    expected: keys.len(),
                    actual: values.len(),
                })
            }
            Err(err) => {
                warn!(loader = self.name, batch = batch.id, error = %err, "batch failed");
                Err(LoadError::from(err))
            }
        }
    }
}

impl<K, V> Pending<K, V>
where
    K: BatchKey,
    V: Clone + Send + Sync + 'static,
{
    /// Whether the result is available without waiting.
    pub fn is_settled(&self) -> bool {
        match &self.slot {
            Slot::Ready(_) => true,
            Slot::Pending { batch, .. } => batch.outcome.initialized(),
        }
    }

    pub async fn wait(self) -> Result<V, LoadError> {
        let (batch, index) = match self.slot {
            Slot::Ready(result) => return result,
            Slot::Pending { batch, index } => (batch, index),
        };
        if let Some(outcome) = batch.outcome.get() {
            return pick(outcome, index);
        }

        let inner = &self.loader.inner;
        if inner.scope.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let settle = async {
            if !batch.is_sealed() {
                inner.collection_window().await;
            }
            inner.settle(&batch).await
        };

        tokio::select! {
            biased;
            outcome = settle => pick(outcome, index),
            _ = inner.scope.cancelled() => {
                debug!(loader = inner.name, batch = batch.id, "load cancelled");
                Err(LoadError::Cancelled)
            }
        }
    }
}
