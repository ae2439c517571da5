//! Redis cache implementation.
//!
//! Fixed-window rate limiting and the distributed lock that serializes
//! allocations into the same room.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client, RedisError};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

use crate::config::{
    Config, CACHE_PREFIX_LOCK, CACHE_PREFIX_RATE_LIMIT, DEFAULT_LOCK_RETRIES, DEFAULT_LOCK_RETRY_DELAY_MS, DEFAULT_LOCK_TTL_SECONDS,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Redis connection shared by the rate limiter and the lock.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }

    /// Round-trip to Redis for health checks.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    // =========================================================================
    // Rate Limiting Operations
    // =========================================================================

    /// Count one request against a fixed window.
    /// Returns (current_count, is_allowed).
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        // INCR and EXPIRE NX together so a crash between them cannot
        // leave a counter without a TTL
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .cmd("EXPIRE")
            .arg(&key)
            .arg(window_seconds)
            .arg("NX")
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        let count = count.max(0) as u64;
        Ok((count, count <= max_requests))
    }

    // =========================================================================
    // Distributed Lock Operations
    // =========================================================================

    /// Acquire a distributed lock with custom options.
    pub async fn acquire_lock_with_options(
        &self,
        resource: &str,
        ttl_seconds: u64,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> AppResult<LockGuard> {
        let key = format!("{}{}", CACHE_PREFIX_LOCK, resource);
        let lock_id = Uuid::new_v4().to_string();
        let mut conn = self.connection.clone();

        for attempt in 0..=max_retries {
            let acquired: bool = redis::cmd("SET")
                .arg(&key)
                .arg(&lock_id)
                .arg("NX")
                .arg("EX")
                .arg(ttl_seconds)
                .query_async(&mut conn)
                .await
                .map(|r: Option<String>| r.is_some())
                .map_err(cache_error)?;

            if acquired {
                tracing::debug!(resource = %resource, lock_id = %lock_id, "Lock acquired");
                return Ok(LockGuard {
                    held: Some(HeldLock {
                        cache: Arc::new(self.clone()),
                        key,
                        lock_id,
                    }),
                });
            }

            if attempt < max_retries {
                sleep(Duration::from_millis(retry_delay_ms)).await;
            }
        }

        tracing::warn!(resource = %resource, "Failed to acquire lock after retries");
        Err(AppError::busy(
            "Room is busy with another allocation, please try again",
        ))
    }

    /// Release a lock only if `lock_id` still owns it.
    async fn release_lock(&self, key: &str, lock_id: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();

        let script = r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#;

        let released: i32 = redis::cmd("EVAL")
            .arg(script)
            .arg(1)
            .arg(key)
            .arg(lock_id)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(released == 1)
    }
}

/// Request counters behind the rate limit middleware.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one hit for `identifier`; returns (count, allowed).
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;

    async fn ping(&self) -> AppResult<()>;
}

#[async_trait]
impl RateLimitStore for Cache {
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        Cache::check_rate_limit(self, identifier, max_requests, window_seconds).await
    }

    async fn ping(&self) -> AppResult<()> {
        Cache::ping(self).await
    }
}

/// Mutual exclusion across server instances.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Block (with bounded retries) until `resource` is ours.
    async fn acquire(&self, resource: &str) -> AppResult<LockGuard>;
}

#[async_trait]
impl DistributedLock for Cache {
    async fn acquire(&self, resource: &str) -> AppResult<LockGuard> {
        self.acquire_lock_with_options(
            resource,
            DEFAULT_LOCK_TTL_SECONDS,
            DEFAULT_LOCK_RETRIES,
            DEFAULT_LOCK_RETRY_DELAY_MS,
        )
        .await
    }
}

// =============================================================================
// Lock Guard (RAII)
// =============================================================================

struct HeldLock {
    cache: Arc<Cache>,
    key: String,
    lock_id: String,
}

/// RAII guard for distributed locks.
/// Releases the lock when dropped.
pub struct LockGuard {
    held: Option<HeldLock>,
}

impl LockGuard {
    /// A guard that holds nothing, for lock implementations without Redis.
    pub fn detached() -> Self {
        Self { held: None }
    }

    /// Release the lock now instead of on drop.
    pub async fn release(mut self) -> AppResult<()> {
        if let Some(held) = self.held.take() {
            if held.cache.release_lock(&held.key, &held.lock_id).await? {
                tracing::debug!(key = %held.key, "Lock released");
            }
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(held) = self.held.take() {
            tokio::spawn(async move {
                if let Err(e) = held.cache.release_lock(&held.key, &held.lock_id).await {
                    tracing::error!(key = %held.key, error = %e, "Failed to release lock on drop");
                } else {
                    tracing::debug!(key = %held.key, "Lock released on drop");
                }
            });
        }
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_detached_guard_releases_nothing() {
        let guard = LockGuard::detached();
        assert!(guard.release().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_lock_hands_out_guards() {
        let mut lock = MockDistributedLock::new();
        lock.expect_acquire()
            .withf(|resource| resource == "room:42")
            .times(1)
            .returning(|_| Ok(LockGuard::detached()));

        let guard = lock.acquire("room:42").await;
        assert!(guard.is_ok());
    }
}
