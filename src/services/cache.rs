use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Two-tier cache for competitive-rate lookups
///
/// L1 is an in-process moka cache, L2 is Redis shared across instances.
/// Rate queries are metered third-party calls and the answers drift slowly,
/// so both tiers carry the same TTL. Reconciliation results are never
/// cached; the core recomputes them from inputs.
pub struct CacheManager {
    redis: Mutex<ConnectionManager>,
    local: moka::future::Cache<String, String>,
    ttl: Duration,
}

impl CacheManager {
    /// Connect to Redis and build the in-process tier
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let ttl = Duration::from_secs(ttl_secs);
        let local = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(ttl)
            .build();

        Ok(Self {
            redis: Mutex::new(redis),
            local,
            ttl,
        })
    }

    /// Look a value up, trying the in-process tier before Redis
    ///
    /// Returns `Ok(None)` on a miss in both tiers.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        if let Some(json) = self.local.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_str(&json)?));
        }

        let remote: Option<String> = {
            let mut conn = self.redis.lock().await;
            redis::cmd("GET").arg(key).query_async(&mut *conn).await?
        };

        match remote {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                // Promote to L1 so the next lookup stays in-process
                self.local.insert(key.to_string(), json.clone()).await;
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Store a value in both tiers
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;

        self.local.insert(key.to_string(), json.clone()).await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl.as_secs())
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Drop a key from both tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.local.invalidate(key).await;

        let mut conn = self.redis.lock().await;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut *conn)
            .await?;

        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a competitive-rate lookup
    pub fn rates(postal_code: &str, radius_miles: f64, unit_size: Option<&str>) -> String {
        format!(
            "rates:{}:{}:{}",
            postal_code,
            radius_miles,
            unit_size.unwrap_or("any")
        )
    }

    /// Build a cache key for a rate history read
    pub fn rate_history(postal_code: &str, unit_size: Option<&str>) -> String {
        format!("history:{}:{}", postal_code, unit_size.unwrap_or("any"))
    }
}
