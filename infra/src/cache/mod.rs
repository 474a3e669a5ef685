//! Cache module for send stores
//!
//! Provides the Redis client with connection retry logic and the two
//! `SendCacheStore` implementations built on it: Redis for shared
//! deployments and an in-process store for tests and single instances.

pub mod memory_store;
pub mod redis_client;
pub mod redis_store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use sc_core::services::SendCacheStore;

use crate::InfrastructureError;

pub use memory_store::MemorySendCache;
pub use redis_client::RedisClient;
pub use redis_store::RedisSendCache;

// Re-export commonly used types
pub use sc_shared::config::cache::CacheConfig;

/// URL scheme selecting the in-process store
pub const MEMORY_URL: &str = "memory://";

/// Create the send store for `channel` based on configuration
///
/// A `memory://` URL selects [`MemorySendCache`]; anything else is opened
/// as a Redis connection.
pub async fn create_send_cache(
    config: &CacheConfig,
    channel: &str,
) -> Result<Arc<dyn SendCacheStore>, InfrastructureError> {
    if config.url.starts_with(MEMORY_URL) {
        tracing::info!(channel, "Using in-memory send store");
        return Ok(Arc::new(MemorySendCache::new(channel)));
    }

    let client = RedisClient::new(config.clone()).await?;
    Ok(Arc::new(RedisSendCache::new(client, channel)))
}
