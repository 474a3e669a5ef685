//! Redis cache client implementation
//!
//! This module provides a Redis client with connection retry logic and the
//! operations the send stores need: hash reads and writes, expiry, existence
//! checks, deletion and the atomic `SET NX EX` used for dispatch locks.
//!
//! Keys are logged only at trace level since they embed recipients.

use redis::{
    aio::MultiplexedConnection,
    AsyncCommands, Client, IntoConnectionInfo, RedisError, RedisResult,
};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis cache client with connection retry logic
///
/// Cloning is cheap; clones share the multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// Connection attempts are retried `config.max_retries` times with
    /// exponential backoff starting at `config.retry_delay_ms`.
    ///
    /// # Example
    /// ```no_run
    /// use sc_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_database(1);
    ///     let client = RedisClient::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            url = %mask_url(&config.url),
            database = config.database,
            "Creating Redis client"
        );

        let mut info = config.url.as_str().into_connection_info().map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;
        if config.database != 0 {
            info.redis.db = i64::from(config.database);
        }

        let client = Client::open(info).map_err(|e| {
            error!("Failed to open Redis client: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.max_retries, config.retry_delay_ms)
                .await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(
                        "Failed to connect to Redis after {} attempts: {}",
                        attempts, e
                    );
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Read every field of a hash
    ///
    /// A missing key reads as an empty map.
    pub async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, InfrastructureError> {
        trace!(key, "HGETALL");

        self.execute_with_retry(RetryPolicy::Transient, |mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.hgetall::<_, HashMap<String, String>>(key).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to read hash: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Write the given fields into a hash
    ///
    /// Existing fields not in `fields` are kept, as is the key's TTL.
    /// Returns false without touching Redis when `fields` is empty.
    pub async fn hset_multiple(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
    ) -> Result<bool, InfrastructureError> {
        if fields.is_empty() {
            debug!("Skipping hash write with no fields");
            return Ok(false);
        }

        trace!(key, fields = fields.len(), "HSET");

        let items: Vec<(String, String)> = fields
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();

        self.execute_with_retry(RetryPolicy::Transient, |mut conn| {
            let key = key.to_string();
            let items = items.clone();
            Box::pin(async move { conn.hset_multiple::<_, _, _, ()>(key, &items).await })
        })
        .await
        .map(|_| true)
        .map_err(|e| {
            error!("Failed to write hash: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Set a key's time to live
    ///
    /// Returns false when the key does not exist.
    pub async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, InfrastructureError> {
        trace!(key, ttl_seconds, "EXPIRE");

        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        self.execute_with_retry(RetryPolicy::Transient, |mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.expire::<_, bool>(key, ttl).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to set expiry: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Check if a key exists in cache
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        trace!(key, "EXISTS");

        self.execute_with_retry(RetryPolicy::Transient, |mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to check key existence: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Delete a key from cache
    ///
    /// Returns true if the key was deleted, false if it was not found.
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        trace!(key, "DEL");

        self.execute_with_retry(RetryPolicy::Transient, |mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.del::<_, u32>(key).await })
        })
        .await
        .map(|deleted| deleted > 0)
        .map_err(|e| {
            error!("Failed to delete key: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Set `key` to `value` with a TTL only if it does not exist (`SET NX EX`)
    ///
    /// Returns true when this call created the key. Not retried: a lost reply
    /// may hide a successful `SET`, and a retry would then find the caller's
    /// own key and report the lock as taken.
    pub async fn set_nx_ex(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, InfrastructureError> {
        trace!(key, ttl_seconds, "SET NX EX");

        self.execute_with_retry(RetryPolicy::Never, |mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            Box::pin(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl_seconds)
                    .query_async::<_, Option<String>>(&mut conn)
                    .await
            })
        })
        .await
        .map(|reply| reply.is_some())
        .map_err(|e| {
            error!("Failed to set key if absent: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Get time-to-live for a key
    ///
    /// None if the key doesn't exist or has no expiry.
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        trace!(key, "TTL");

        let result = self
            .execute_with_retry(RetryPolicy::Transient, |mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await;

        match result {
            Ok(ttl) if ttl >= 0 => Ok(Some(ttl)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!("Failed to get TTL: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(RetryPolicy::Transient, |mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation with automatic retry logic
    ///
    /// Under `RetryPolicy::Transient` only transient errors are retried, with
    /// exponential backoff.
    async fn execute_with_retry<F, T>(&self, policy: RetryPolicy, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if should_retry(policy, &e, attempts, self.config.max_retries) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a failed operation may be sent again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryPolicy {
    /// Idempotent command, retry transient errors
    Transient,
    /// Command whose replay can change its outcome
    Never,
}

/// Decide whether attempt number `attempts` failing with `error` is retried
pub(crate) fn should_retry(
    policy: RetryPolicy,
    error: &RedisError,
    attempts: u32,
    max_retries: u32,
) -> bool {
    policy == RetryPolicy::Transient && attempts < max_retries && is_retriable_error(error)
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Hide credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
