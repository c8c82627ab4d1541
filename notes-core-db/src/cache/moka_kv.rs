use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use tokio::sync::Mutex;

use super::{CacheError, CacheResult, KvCache};

/// Default maximum number of keys.
pub const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
enum CacheValue {
    Text(String),
    Set(BTreeSet<String>),
    Hash(BTreeMap<String, String>),
}

impl CacheValue {
    fn kind(&self) -> &'static str {
        match self {
            CacheValue::Text(_) => "text",
            CacheValue::Set(_) => "set",
            CacheValue::Hash(_) => "hash",
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CacheValue,
    ttl: Option<Duration>,
}

/// Expires each entry after its own TTL, restarted on every write.
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// In-process [`KvCache`] backed by moka.
///
/// Reads are lock-free. Set and hash updates are read-modify-write and
/// run one at a time.
pub struct MokaKvCache {
    cache: Cache<String, CacheEntry>,
    writes: Mutex<()>,
}

impl std::fmt::Debug for MokaKvCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaKvCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl Default for MokaKvCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MokaKvCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(EntryExpiry)
                .build(),
            writes: Mutex::new(()),
        }
    }

    async fn set_entry(&self, key: &str) -> CacheResult<BTreeSet<String>> {
        match self.cache.get(key).await {
            None => Ok(BTreeSet::new()),
            Some(CacheEntry {
                value: CacheValue::Set(members),
                ..
            }) => Ok(members),
            Some(other) => Err(wrong_type(key, "set", &other.value)),
        }
    }

    async fn hash_entry(&self, key: &str) -> CacheResult<BTreeMap<String, String>> {
        match self.cache.get(key).await {
            None => Ok(BTreeMap::new()),
            Some(CacheEntry {
                value: CacheValue::Hash(fields),
                ..
            }) => Ok(fields),
            Some(other) => Err(wrong_type(key, "hash", &other.value)),
        }
    }

    async fn store(&self, key: &str, value: CacheValue) {
        let empty = match &value {
            CacheValue::Set(members) => members.is_empty(),
            CacheValue::Hash(fields) => fields.is_empty(),
            CacheValue::Text(_) => false,
        };
        if empty {
            self.cache.invalidate(key).await;
        } else {
            self.cache
                .insert(key.to_string(), CacheEntry { value, ttl: None })
                .await;
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, actual: &CacheValue) -> CacheError {
    CacheError::WrongType {
        key: key.to_string(),
        expected,
        actual: actual.kind(),
    }
}

#[async_trait]
impl KvCache for MokaKvCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self.cache.get(key).await {
            None => Ok(None),
            Some(CacheEntry {
                value: CacheValue::Text(text),
                ..
            }) => Ok(Some(text)),
            Some(other) => Err(wrong_type(key, "text", &other.value)),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        self.cache
            .insert(
                key.to_string(),
                CacheEntry {
                    value: CacheValue::Text(value),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let _guard = self.writes.lock().await;
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn set_add(&self, key: &str, members: &[&str]) -> CacheResult<usize> {
        let _guard = self.writes.lock().await;
        let mut set = self.set_entry(key).await?;
        let added = members
            .iter()
            .filter(|member| set.insert(member.to_string()))
            .count();
        self.store(key, CacheValue::Set(set)).await;
        Ok(added)
    }

    async fn set_remove(&self, key: &str, members: &[&str]) -> CacheResult<usize> {
        let _guard = self.writes.lock().await;
        let mut set = self.set_entry(key).await?;
        let removed = members.iter().filter(|member| set.remove(**member)).count();
        self.store(key, CacheValue::Set(set)).await;
        Ok(removed)
    }

    async fn set_contains(&self, key: &str, member: &str) -> CacheResult<bool> {
        Ok(self.set_entry(key).await?.contains(member))
    }

    async fn set_members(&self, key: &str) -> CacheResult<Vec<String>> {
        Ok(self.set_entry(key).await?.into_iter().collect())
    }

    async fn hash_set(&self, key: &str, field: &str, value: String) -> CacheResult<()> {
        let _guard = self.writes.lock().await;
        let mut fields = self.hash_entry(key).await?;
        fields.insert(field.to_string(), value);
        self.store(key, CacheValue::Hash(fields)).await;
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        Ok(self.hash_entry(key).await?.remove(field))
    }

    async fn hash_delete(&self, key: &str, field: &str) -> CacheResult<bool> {
        let _guard = self.writes.lock().await;
        let mut fields = self.hash_entry(key).await?;
        let existed = fields.remove(field).is_some();
        self.store(key, CacheValue::Hash(fields)).await;
        Ok(existed)
    }

    async fn hash_get_all(&self, key: &str) -> CacheResult<BTreeMap<String, String>> {
        self.hash_entry(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::KvCacheExt;
    use serde::{Deserialize, Serialize};

    #[tokio::test]
    async fn test_text_values() {
        let cache = MokaKvCache::default();
        assert_eq!(cache.get("greeting").await.unwrap(), None);

        cache.set("greeting", "hello".to_string(), None).await.unwrap();
        assert_eq!(cache.get("greeting").await.unwrap().as_deref(), Some("hello"));

        assert!(cache.delete("greeting").await.unwrap());
        assert!(!cache.delete("greeting").await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_expires_entry() {
        let cache = MokaKvCache::default();
        cache
            .set("short", "lived".to_string(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        cache.set("long", "lived".to_string(), None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(cache.get("short").await.unwrap(), None);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_objects() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Scope {
            program: String,
            wildcard: bool,
        }

        let cache = MokaKvCache::default();
        let scope = Scope {
            program: "acme".to_string(),
            wildcard: true,
        };
        cache.set_object("scope:acme", &scope, None).await.unwrap();
        let loaded: Option<Scope> = cache.get_object("scope:acme").await.unwrap();
        assert_eq!(loaded, Some(scope));

        cache.set("scope:broken", "{".to_string(), None).await.unwrap();
        let broken: CacheResult<Option<Scope>> = cache.get_object("scope:broken").await;
        assert!(matches!(broken, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_sets() {
        let cache = MokaKvCache::default();
        assert_eq!(cache.set_add("hosts", &["b.acme.com", "a.acme.com"]).await.unwrap(), 2);
        assert_eq!(cache.set_add("hosts", &["a.acme.com", "c.acme.com"]).await.unwrap(), 1);
        assert!(cache.set_contains("hosts", "c.acme.com").await.unwrap());
        assert_eq!(
            cache.set_members("hosts").await.unwrap(),
            vec!["a.acme.com", "b.acme.com", "c.acme.com"]
        );

        assert_eq!(cache.set_remove("hosts", &["a.acme.com", "z.acme.com"]).await.unwrap(), 1);
        assert_eq!(cache.set_remove("hosts", &["b.acme.com", "c.acme.com"]).await.unwrap(), 2);
        assert!(cache.set_members("hosts").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hashes() {
        let cache = MokaKvCache::default();
        cache.hash_set("session", "user", "me".to_string()).await.unwrap();
        cache.hash_set("session", "theme", "dark".to_string()).await.unwrap();

        assert_eq!(cache.hash_get("session", "user").await.unwrap().as_deref(), Some("me"));
        assert!(cache.hash_delete("session", "user").await.unwrap());
        assert!(!cache.hash_delete("session", "user").await.unwrap());

        let all = cache.hash_get_all("session").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.get("theme").map(String::as_str), Some("dark"));
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let cache = MokaKvCache::default();
        tokio_test::assert_ok!(cache.set("plain", "text".to_string(), None).await);

        let err = cache.set_add("plain", &["x"]).await.unwrap_err();
        assert_eq!(
            err,
            CacheError::WrongType {
                key: "plain".to_string(),
                expected: "set",
                actual: "text",
            }
        );
        tokio_test::assert_err!(cache.hash_get("plain", "field").await);
    }
}
