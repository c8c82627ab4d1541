use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::auth::Authenticated;

/// Request-scoped carrier of typed values.
///
/// Values are keyed by their type, so each type can be stored at most once
/// per request. Only the outermost request-handling layer should reach into
/// the context; everything below it receives its dependencies explicitly.
#[derive(Default)]
pub struct RequestContext {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the previous value of the same type if any.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Whether the authentication layer marked this request as authenticated.
    /// A context without an authentication result is treated as anonymous.
    pub fn is_authenticated(&self) -> bool {
        self.get::<Authenticated>().is_some_and(|auth| auth.0)
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("values", &self.values.len())
            .finish()
    }
}
