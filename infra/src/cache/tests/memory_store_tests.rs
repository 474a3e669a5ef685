//! Unit tests for the in-memory send store

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sc_core::errors::SendCodeError;
use sc_core::services::{CodeMessage, CodeSender, SendCacheStore, SendCodeRequest, SendCodeService};
use sc_shared::SendCodeConfig;

use crate::cache::MemorySendCache;

fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_missing_key_reads_empty() {
    let store = MemorySendCache::new("sms");

    assert!(store.get("sms:code_cache:u1").await.unwrap().is_empty());
    assert!(!store.exists("sms:code_cache:u1").await.unwrap());
    assert!(!store.del("sms:code_cache:u1").await.unwrap());
    assert!(!store.expire("sms:code_cache:u1", 60).await.unwrap());
    assert_eq!(store.name(), "sms");
}

#[tokio::test]
async fn test_set_merges_fields() {
    let store = MemorySendCache::new("sms");

    assert!(store.set("k", &fields(&[("num", "1"), ("time", "100")])).await.unwrap());
    assert!(store.set("k", &fields(&[("num", "2")])).await.unwrap());

    assert_eq!(
        store.get("k").await.unwrap(),
        fields(&[("num", "2"), ("time", "100")])
    );
    assert!(!store.set("k", &HashMap::new()).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_set_keeps_ttl() {
    let store = MemorySendCache::new("sms");

    store.set("k", &fields(&[("num", "1")])).await.unwrap();
    assert_eq!(store.ttl("k"), None);

    assert!(store.expire("k", 100).await.unwrap());
    tokio::time::advance(Duration::from_secs(40)).await;

    store.set("k", &fields(&[("num", "2")])).await.unwrap();
    assert_eq!(store.ttl("k"), Some(Duration::from_secs(60)));
}

#[tokio::test(start_paused = true)]
async fn test_keys_expire() {
    let store = MemorySendCache::new("sms");

    store.set("k", &fields(&[("code", "123456")])).await.unwrap();
    store.expire("k", 30).await.unwrap();

    tokio::time::advance(Duration::from_secs(29)).await;
    assert!(store.exists("k").await.unwrap());

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(!store.exists("k").await.unwrap());
    assert!(store.get("k").await.unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_lock_is_exclusive_until_expiry() {
    let store = MemorySendCache::new("sms");

    assert!(store.lock("sms:lock:abc", 5).await.unwrap());
    assert!(!store.lock("sms:lock:abc", 5).await.unwrap());

    tokio::time::advance(Duration::from_secs(5)).await;
    assert!(store.lock("sms:lock:abc", 5).await.unwrap());
}

#[tokio::test]
async fn test_unlock_releases_lock() {
    let store = MemorySendCache::new("sms");

    assert!(store.lock("sms:lock:abc", 5).await.unwrap());
    assert!(store.unlock("sms:lock:abc").await.unwrap());
    assert!(store.lock("sms:lock:abc", 5).await.unwrap());
}

#[tokio::test]
async fn test_lock_only_one_of_many_wins() {
    let store = Arc::new(MemorySendCache::new("sms"));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.lock("sms:lock:abc", 5).await.unwrap() })
        })
        .collect();

    let mut acquired = 0;
    for handle in handles {
        if handle.await.unwrap() {
            acquired += 1;
        }
    }
    assert_eq!(acquired, 1);
}

#[tokio::test]
async fn test_hash_read_of_lock_key_fails() {
    let store = MemorySendCache::new("sms");

    store.lock("sms:lock:abc", 5).await.unwrap();
    assert!(store.get("sms:lock:abc").await.is_err());
    assert!(store.set("sms:lock:abc", &fields(&[("a", "b")])).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_purge_expired() {
    let store = MemorySendCache::new("sms");

    store.set("a", &fields(&[("num", "1")])).await.unwrap();
    store.set("b", &fields(&[("num", "1")])).await.unwrap();
    store.expire("a", 10).await.unwrap();

    tokio::time::advance(Duration::from_secs(10)).await;
    assert_eq!(store.purge_expired().unwrap(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_writes_sweep_expired_keys_once_due() {
    let store = MemorySendCache::new("sms").with_sweep_interval(Duration::from_secs(30));

    for i in 0..10 {
        let key = format!("sms:code_cache:u{}", i);
        store.set(&key, &fields(&[("code", "123456")])).await.unwrap();
        store.expire(&key, 10).await.unwrap();
    }

    // Expired but not yet due for a sweep
    tokio::time::advance(Duration::from_secs(20)).await;
    store.set("other", &fields(&[("num", "1")])).await.unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.raw_len(), 11);

    tokio::time::advance(Duration::from_secs(10)).await;
    assert!(store.lock("sms:lock:abc", 5).await.unwrap());
    assert_eq!(store.raw_len(), 2);
}

struct AlwaysDelivers;

#[async_trait::async_trait]
impl CodeSender for AlwaysDelivers {
    async fn send_code(&self, _message: &CodeMessage<'_>) -> bool {
        true
    }
}

#[tokio::test]
async fn test_dispatch_over_memory_store() {
    let store = Arc::new(MemorySendCache::new("sms"));
    let service = SendCodeService::new(store.clone(), Arc::new(AlwaysDelivers), SendCodeConfig::default());

    let request = SendCodeRequest::new().to("+8613812345678").code("123456");
    assert_eq!(service.send(&request, false).await.unwrap(), 60);

    match service.send(&request, false).await {
        Err(SendCodeError::WaitInterval(data)) => assert!(data.interval > 0 && data.interval <= 60),
        other => panic!("Expected wait interval error, got {:?}", other),
    }

    let tracker = service.tracker("+8613812345678", None);
    assert!(tracker.verify_and_consume("123456").await.is_ok());
    assert_eq!(
        tracker.verify("123456").await.unwrap_err(),
        SendCodeError::InvalidCode
    );

    // Lock released and code consumed; only the count record remains
    assert!(!store.exists(&service.lock_key("+8613812345678")).await.unwrap());
    assert_eq!(store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_recipients_never_seen_again_are_reclaimed() {
    let store = Arc::new(MemorySendCache::new("sms"));
    let service = SendCodeService::new(store.clone(), Arc::new(AlwaysDelivers), SendCodeConfig::default());

    for i in 0..1000 {
        let request = SendCodeRequest::new().to(format!("u{}", i)).code("123456");
        service.send(&request, false).await.unwrap();
    }
    assert_eq!(store.raw_len(), 2000);

    // Past both the code window and the daily reset
    tokio::time::advance(Duration::from_secs(3 * 86_400)).await;

    let request = SendCodeRequest::new().to("late").code("654321");
    service.send(&request, false).await.unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.raw_len(), 2);
}
