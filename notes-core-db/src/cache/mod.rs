//! Cross-request key-value cache.
//!
//! Unrelated to the per-request loader cache: entries here outlive
//! requests and expire by TTL.

pub mod alias;
pub mod moka_kv;

pub use alias::{CachedAliasStore, DEFAULT_ALIAS_TTL};
pub use moka_kv::{MokaKvCache, DEFAULT_CAPACITY};

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The key holds a value of another kind (text, set or hash).
    #[error("key {key} holds a {actual}, not a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("cache serialization error: {0}")]
    Serialization(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// String key-value cache with TTL, set and hash values.
#[async_trait]
pub trait KvCache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store a text value. `None` keeps it until evicted.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    /// Remove a key of any kind. Returns whether it existed.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Add members to a set, returning how many were new.
    async fn set_add(&self, key: &str, members: &[&str]) -> CacheResult<usize>;

    /// Remove members from a set, returning how many were present.
    async fn set_remove(&self, key: &str, members: &[&str]) -> CacheResult<usize>;

    async fn set_contains(&self, key: &str, member: &str) -> CacheResult<bool>;

    /// Members in ascending order.
    async fn set_members(&self, key: &str) -> CacheResult<Vec<String>>;

    async fn hash_set(&self, key: &str, field: &str, value: String) -> CacheResult<()>;

    async fn hash_get(&self, key: &str, field: &str) -> CacheResult<Option<String>>;

    async fn hash_delete(&self, key: &str, field: &str) -> CacheResult<bool>;

    async fn hash_get_all(&self, key: &str) -> CacheResult<BTreeMap<String, String>>;
}

/// JSON objects on top of text values.
#[async_trait]
pub trait KvCacheExt: KvCache {
    async fn get_object<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set_object<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set(key, raw, ttl).await
    }
}

impl<C: KvCache + ?Sized> KvCacheExt for C {}
