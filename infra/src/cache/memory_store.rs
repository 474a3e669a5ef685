//! In-process send store
//!
//! Keeps records in a mutex-guarded map with per-key deadlines. Expired keys
//! are dropped when touched, and writes sweep the whole map once the sweep
//! interval has passed. Suitable for tests and single-instance deployments;
//! locks are not shared across processes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use sc_core::errors::{CacheError, CacheResult};
use sc_core::services::SendCacheStore;

/// Default minimum time between full sweeps of expired keys
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
enum Value {
    Hash(HashMap<String, String>),
    Lock,
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |deadline| deadline <= now)
    }
}

/// `SendCacheStore` held in process memory
#[derive(Clone)]
pub struct MemorySendCache {
    name: String,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    next_sweep: Arc<Mutex<Instant>>,
    sweep_interval: Duration,
}

impl MemorySendCache {
    /// Create an empty store for the `name` channel
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_sweep: Arc::new(Mutex::new(Instant::now() + DEFAULT_SWEEP_INTERVAL)),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Set the minimum time between full sweeps run by writes
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        if let Ok(mut next_sweep) = self.next_sweep.lock() {
            *next_sweep = Instant::now() + interval;
        }
        self
    }

    /// Remaining time to live of `key`, None when missing or persistent
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries().ok()?;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.deadline)
            .map(|deadline| deadline - now)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries()
            .map(|entries| entries.values().filter(|entry| !entry.is_expired(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored keys, expired ones included until they are swept
    pub fn raw_len(&self) -> usize {
        self.entries().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Drop every expired key
    pub fn purge_expired(&self) -> CacheResult<usize> {
        let mut entries = self.entries()?;
        Ok(self.sweep(&mut entries, Instant::now()))
    }

    fn sweep(&self, entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(store = %self.name, purged, "Purged expired keys");
        }
        purged
    }

    /// Sweep the map if the sweep interval has passed; called with the map locked
    fn sweep_if_due(&self, entries: &mut HashMap<String, Entry>) {
        let now = Instant::now();
        let Ok(mut next_sweep) = self.next_sweep.lock() else {
            return;
        };
        if now < *next_sweep {
            return;
        }
        *next_sweep = now + self.sweep_interval;
        drop(next_sweep);

        self.sweep(entries, now);
    }

    fn entries(&self) -> CacheResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("memory store lock poisoned".to_string()))
    }

    /// Lock the map and drop `key` if it has expired
    fn live(&self, key: &str) -> CacheResult<MutexGuard<'_, HashMap<String, Entry>>> {
        let mut entries = self.entries()?;
        if entries
            .get(key)
            .map_or(false, |entry| entry.is_expired(Instant::now()))
        {
            entries.remove(key);
        }
        Ok(entries)
    }
}

fn wrong_type(key: &str) -> CacheError {
    CacheError::Backend(format!(
        "WRONGTYPE operation against a key holding the wrong kind of value: {}",
        key
    ))
}

#[async_trait]
impl SendCacheStore for MemorySendCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        let entries = self.live(key)?;
        match entries.get(key).map(|entry| &entry.value) {
            Some(Value::Hash(fields)) => Ok(fields.clone()),
            Some(Value::Lock) => Err(wrong_type(key)),
            None => Ok(HashMap::new()),
        }
    }

    async fn set(&self, key: &str, fields: &HashMap<String, String>) -> CacheResult<bool> {
        if fields.is_empty() {
            return Ok(false);
        }

        let mut entries = self.live(key)?;
        self.sweep_if_due(&mut entries);
        match entries.get_mut(key) {
            Some(Entry {
                value: Value::Hash(existing),
                ..
            }) => {
                existing.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Some(_) => return Err(wrong_type(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Hash(fields.clone()),
                        deadline: None,
                    },
                );
            }
        }
        Ok(true)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool> {
        let mut entries = self.live(key)?;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.deadline = Some(Instant::now() + Duration::from_secs(ttl_seconds));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.live(key)?.contains_key(key))
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        Ok(self.live(key)?.remove(key).is_some())
    }

    async fn lock(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool> {
        let mut entries = self.live(key)?;
        self.sweep_if_due(&mut entries);
        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Lock,
                deadline: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
            },
        );
        Ok(true)
    }
}
