//! Traits for cache store and delivery channel integration

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::CacheResult;

/// Value written to a lock key
pub const LOCK_SENTINEL: &str = "1";

/// Key-value store with per-key TTL and an atomic lock primitive
///
/// Each implementation backs one channel; `name` namespaces every key the
/// tracker and the dispatch service derive, so two channels sharing one
/// store never collide.
#[async_trait]
pub trait SendCacheStore: Send + Sync {
    /// Channel identity used as the key namespace
    fn name(&self) -> &str;

    /// Read the field map stored at `key`; an absent key reads as an empty map
    async fn get(&self, key: &str) -> CacheResult<HashMap<String, String>>;

    /// Write `fields` into the map stored at `key`, keeping the key's TTL
    async fn set(&self, key: &str, fields: &HashMap<String, String>) -> CacheResult<bool>;

    /// Set or refresh the TTL of an existing key
    async fn expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool>;

    /// Check whether `key` exists
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Delete `key`; deleting a missing key is not an error
    async fn del(&self, key: &str) -> CacheResult<bool>;

    /// Create `key` with [`LOCK_SENTINEL`] and `ttl_seconds` only if it is absent
    ///
    /// Must be a single atomic operation in the store. Returns true iff this
    /// call created the key.
    async fn lock(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool>;

    /// Release a lock unconditionally (no owner check)
    async fn unlock(&self, key: &str) -> CacheResult<bool> {
        self.del(key).await
    }
}

/// A code ready to be handed to a delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMessage<'a> {
    /// Recipient (phone number, e-mail address, ...)
    pub to: &'a str,
    /// The code to deliver
    pub code: &'a str,
    /// Notification type, if one is configured
    pub kind: Option<&'a str>,
}

/// Delivery channel for verification codes
///
/// Failure is reported as `false`; the dispatch service turns it into a
/// `SendFailure` after releasing the recipient lock.
#[async_trait]
pub trait CodeSender: Send + Sync {
    /// Attempt to deliver `message`, returning whether delivery succeeded
    async fn send_code(&self, message: &CodeMessage<'_>) -> bool;
}
