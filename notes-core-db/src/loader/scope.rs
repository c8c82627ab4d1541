use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info_span, Span};
use uuid::Uuid;

/// Lifetime of one inbound request.
///
/// Carries the request id, the tracing span batches run under, and the
/// cancellation signal every pending load listens to. Clones share state.
#[derive(Debug, Clone)]
pub struct RequestScope {
    inner: Arc<ScopeInner>,
}

#[derive(Debug)]
struct ScopeInner {
    id: Uuid,
    span: Span,
    cancel: watch::Sender<bool>,
}

impl RequestScope {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        let (cancel, _) = watch::channel(false);
        Self {
            inner: Arc::new(ScopeInner {
                id,
                span: info_span!("request", request_id = %id),
                cancel,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn span(&self) -> &Span {
        &self.inner.span
    }

    /// Release every pending load of this scope with `LoadError::Cancelled`.
    pub fn cancel(&self) {
        self.inner.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancel.borrow()
    }

    /// Completes once the scope is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.cancel.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // sender lives as long as the scope
            std::future::pending::<()>().await;
        }
    }

    /// Guard that cancels the scope when dropped, including on unwind.
    pub fn guard(&self) -> CancelGuard {
        CancelGuard {
            scope: Some(self.clone()),
        }
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancels its scope on drop unless disarmed.
#[derive(Debug)]
pub struct CancelGuard {
    scope: Option<RequestScope>,
}

impl CancelGuard {
    /// Let the scope outlive the guard.
    pub fn disarm(mut self) {
        self.scope = None;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if let Some(scope) = self.scope.take() {
            tracing::debug!(request_id = %scope.id(), "request scope dropped, cancelling");
            scope.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_guard_cancels_on_drop() {
        let scope = RequestScope::new();
        let guard = scope.guard();
        assert!(!scope.is_cancelled());

        drop(guard);
        assert!(scope.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), scope.cancelled())
            .await
            .expect("cancelled() resolves after cancel");
    }

    #[tokio::test]
    async fn test_disarmed_guard_leaves_scope_alive() {
        let scope = RequestScope::new();
        scope.guard().disarm();
        assert!(!scope.is_cancelled());
    }

    #[test]
    fn test_scopes_have_distinct_ids() {
        assert_ne!(RequestScope::new().id(), RequestScope::new().id());
    }
}
