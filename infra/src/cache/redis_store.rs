//! Redis-backed send store
//!
//! Records are Redis hashes. The dispatch lock is a plain string key created
//! with `SET NX EX`, so acquisition is a single atomic command.

use async_trait::async_trait;
use std::collections::HashMap;

use sc_core::errors::CacheResult;
use sc_core::services::{SendCacheStore, LOCK_SENTINEL};

use super::redis_client::RedisClient;

/// `SendCacheStore` over a shared Redis connection
///
/// The configured key prefix, if any, is prepended to every key.
#[derive(Clone)]
pub struct RedisSendCache {
    client: RedisClient,
    name: String,
}

impl RedisSendCache {
    /// Create a store for the `name` channel
    pub fn new(client: RedisClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        self.client.config().make_key(key)
    }
}

#[async_trait]
impl SendCacheStore for RedisSendCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        Ok(self.client.hgetall(&self.key(key)).await?)
    }

    async fn set(&self, key: &str, fields: &HashMap<String, String>) -> CacheResult<bool> {
        Ok(self.client.hset_multiple(&self.key(key), fields).await?)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool> {
        Ok(self.client.expire(&self.key(key), ttl_seconds).await?)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.client.exists(&self.key(key)).await?)
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        Ok(self.client.delete(&self.key(key)).await?)
    }

    async fn lock(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool> {
        Ok(self
            .client
            .set_nx_ex(&self.key(key), LOCK_SENTINEL, ttl_seconds)
            .await?)
    }
}
