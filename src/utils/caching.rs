use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::primitives::Address;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::utils::monitoring::ApiMetrics;

/// Time-to-live per cached entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub user_data: Duration,
    pub reserve_data: Duration,
    pub balances: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            user_data: Duration::from_secs(30),
            reserve_data: Duration::from_secs(60),
            balances: Duration::from_secs(30),
        }
    }
}

/// Whether a value was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Deterministic cache keys. Addresses are always lower-cased.
pub struct CacheKey;

impl CacheKey {
    pub fn user(user: &Address) -> String {
        format!("user:{}", lower(user))
    }

    pub fn reserve(asset: &Address) -> String {
        format!("reserve:{}", lower(asset))
    }

    pub fn balance(user: &Address, token: &Address) -> String {
        format!("balance:{}:{}", lower(user), lower(token))
    }

    pub fn allowance(owner: &Address, token: &Address) -> String {
        format!("allowance:{}:{}", lower(owner), lower(token))
    }
}

fn lower(address: &Address) -> String {
    address.to_string().to_lowercase()
}

/// Raw string key/value store with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), AppError>;

    fn backend(&self) -> &'static str;
}

#[derive(Clone)]
struct StoredEntry {
    payload: Arc<str>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, StoredEntry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &StoredEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local store used when no shared cache is configured.
pub struct InMemoryStore {
    entries: Cache<String, StoredEntry>,
}

impl InMemoryStore {
    pub fn new(max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        info!(max_capacity, "In-memory cache initialized");
        Self { entries }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).await.map(|entry| entry.payload.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), AppError> {
        let entry = StoredEntry {
            payload: Arc::from(value),
            ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Shared store backed by redis. Keys are namespaced as `{namespace}:{key}`.
pub struct RedisStore {
    connection: ConnectionManager,
    namespace: String,
}

impl RedisStore {
    pub async fn connect(url: &str, namespace: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        info!(namespace, "Redis cache initialized");
        Ok(Self {
            connection,
            namespace: namespace.to_string(),
        })
    }

}

fn namespaced(namespace: &str, key: &str) -> String {
    format!("{}:{}", namespace, key)
}

/// Whole seconds for `SET EX`, which rejects a zero expiry.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(namespaced(&self.namespace, key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(namespaced(&self.namespace, key), value, expiry_seconds(ttl))
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Typed JSON view over a [`CacheStore`]. Store and codec failures degrade to a
/// miss on read and a no-op on write.
#[derive(Clone)]
pub struct ReadThroughCache {
    store: Arc<dyn CacheStore>,
    metrics: Arc<ApiMetrics>,
}

impl ReadThroughCache {
    pub fn new(store: Arc<dyn CacheStore>, metrics: Arc<ApiMetrics>) -> Self {
        Self { store, metrics }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn get<T: DeserializeOwned>(&self, entity: &str, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        };

        let value = raw.and_then(|raw| match serde_json::from_str::<T>(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        });

        if value.is_some() {
            debug!(key, "Cache hit");
            self.metrics.record_cache_hit(entity);
        } else {
            debug!(key, "Cache miss");
            self.metrics.record_cache_miss(entity);
        }

        value
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Skipping cache write for unserializable value");
                return;
            }
        };

        if let Err(e) = self.store.set(key, payload, ttl).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }
}
