use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use notes_core_api::ApiError;

use crate::error::StoreError;

/// Failure of one batched lookup.
///
/// Cloneable so that a failed batch hands the same error to every key it
/// carried: each `Store` clone points at one shared `StoreError`.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(Arc<StoreError>),

    #[error("request cancelled before the batch resolved")]
    Cancelled,

    #[error("batch returned {actual} results for {expected} keys")]
    BatchSizeMismatch { expected: usize, actual: usize },
}

impl LoadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }

    /// Whether two errors come from the same failed batch execution.
    pub fn same_failure(&self, other: &LoadError) -> bool {
        match (self, other) {
            (LoadError::Store(a), LoadError::Store(b)) => Arc::ptr_eq(a, b),
            (LoadError::Cancelled, LoadError::Cancelled) => true,
            (
                LoadError::BatchSizeMismatch { expected: a, actual: b },
                LoadError::BatchSizeMismatch { expected: c, actual: d },
            ) => a == c && b == d,
            _ => false,
        }
    }
}

impl From<StoreError> for LoadError {
    fn from(err: StoreError) -> Self {
        LoadError::Store(Arc::new(err))
    }
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Cancelled => ApiError::InternalError("request cancelled".to_string()),
            other => {
                error!(error = %other, "batched load failed");
                ApiError::InternalError("internal server error".to_string())
            }
        }
    }
}
