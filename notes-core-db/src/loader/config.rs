use std::time::Duration;

/// Default upper bound on keys per batch: none, so one round is one batch.
pub const DEFAULT_MAX_BATCH: usize = 0;

/// Per-loader batching behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Collection window before a batch executes. Zero yields once to the
    /// scheduler instead of sleeping.
    pub wait: Duration,

    /// Maximum keys per batch, 0 for unlimited.
    pub max_batch: usize,

    /// Memoize results per key for the loader's lifetime.
    pub cache: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            wait: Duration::ZERO,
            max_batch: DEFAULT_MAX_BATCH,
            cache: true,
        }
    }
}

impl LoaderConfig {
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = false;
        self
    }

    pub(crate) fn batch_is_full(&self, len: usize) -> bool {
        self.max_batch > 0 && len >= self.max_batch
    }
}
