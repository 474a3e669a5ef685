//! Unit tests for the throttle tracker

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::SendCodeError;
use crate::services::send_code::{IntervalTable, SendCacheStore, ThrottleTracker};

use super::mocks::{ManualClock, MockSendCache};

fn tracker(cache: &Arc<MockSendCache>, clock: &Arc<ManualClock>, to: &str) -> ThrottleTracker<MockSendCache> {
    ThrottleTracker::new(cache.clone(), to).clock(clock.clone())
}

#[test]
fn test_key_layout() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));

    let plain = tracker(&cache, &clock, "13812345678");
    assert_eq!(plain.code_key(), "sms:code_cache:13812345678");
    assert_eq!(plain.num_key(), "sms:num_cache:13812345678");

    let typed = tracker(&cache, &clock, "13812345678").kind(Some("login"));
    assert_eq!(typed.code_key(), "sms:code_cache:13812345678:login");
    assert_eq!(typed.num_key(), "sms:num_cache:13812345678:login");

    let empty_type = tracker(&cache, &clock, "13812345678").kind(Some(""));
    assert_eq!(empty_type.code_key(), "sms:code_cache:13812345678");
}

#[tokio::test]
async fn test_first_check_always_passes() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));

    let tracker = tracker(&cache, &clock, "u1");
    assert!(tracker.check_send_allowed().await.is_ok());
    assert_eq!(tracker.next_interval().await.unwrap(), 60);
}

#[tokio::test]
async fn test_record_send_writes_code_and_count() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    tracker.record_send("123456").await.unwrap();

    let code = tracker.code_record().await.unwrap();
    assert_eq!(code.code, "123456");
    assert_eq!(code.issued_at, clock.now_timestamp());
    assert_eq!(cache.ttl(&tracker.code_key()), Some(1800));

    let attempts = tracker.attempt_record().await.unwrap();
    assert_eq!(attempts.count, 1);
    assert_eq!(attempts.last_sent_at, clock.now_timestamp());

    let num_ttl = cache.ttl(&tracker.num_key()).expect("count expires at midnight");
    assert!(num_ttl > 0 && num_ttl <= 86_400);
}

#[tokio::test]
async fn test_count_ttl_set_only_on_creation() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    tracker.record_send("111111").await.unwrap();
    let first_ttl = cache.ttl(&tracker.num_key()).unwrap();

    clock.advance(120);
    tracker.record_send("222222").await.unwrap();

    // The daily reset does not move with later sends
    assert_eq!(cache.ttl(&tracker.num_key()), Some(first_ttl - 120));
    assert_eq!(tracker.attempt_record().await.unwrap().count, 2);
    // The code window restarts on every send
    assert_eq!(cache.ttl(&tracker.code_key()), Some(1800));
}

#[tokio::test]
async fn test_wait_interval_reports_remaining_seconds() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    tracker.record_send("123456").await.unwrap();
    clock.advance(15);

    match tracker.check_send_allowed().await {
        Err(SendCodeError::WaitInterval(data)) => {
            assert_eq!(data.to, "u1");
            assert_eq!(data.interval, 45);
        }
        other => panic!("Expected wait interval error, got {:?}", other),
    }

    clock.advance(45);
    assert!(tracker.check_send_allowed().await.is_ok());
}

#[tokio::test]
async fn test_escalation_follows_table() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1")
        .interval(IntervalTable::from(BTreeMap::from([(1, 10), (2, 20), (4, 40)])));

    let mut observed = Vec::new();
    for _ in 0..5 {
        tracker.check_send_allowed().await.unwrap();
        tracker.record_send("123456").await.unwrap();
        let interval = tracker.next_interval().await.unwrap();
        observed.push(interval);
        clock.advance(interval as i64);
    }

    assert_eq!(observed, vec![10, 20, 20, 40, 40]);
}

#[tokio::test]
async fn test_count_resets_when_daily_record_expires() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    tracker.record_send("123456").await.unwrap();
    tracker.record_send("123456").await.unwrap();
    assert_eq!(tracker.next_interval().await.unwrap(), 180);

    let ttl = cache.ttl(&tracker.num_key()).unwrap();
    clock.advance(ttl);

    assert_eq!(tracker.attempt_record().await.unwrap().count, 0);
    assert!(tracker.check_send_allowed().await.is_ok());
}

#[tokio::test]
async fn test_verify_matches_without_consuming() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    tracker.record_send("123456").await.unwrap();

    assert!(tracker.verify("123456").await.is_ok());
    assert!(tracker.verify("123456").await.is_ok());
    assert_eq!(
        tracker.verify("000000").await.unwrap_err(),
        SendCodeError::CodeNotCorrect
    );
    assert!(cache.contains(&tracker.code_key()));
}

#[tokio::test]
async fn test_verify_without_code_is_invalid() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    assert_eq!(
        tracker.verify("123456").await.unwrap_err(),
        SendCodeError::InvalidCode
    );
}

#[tokio::test]
async fn test_verify_after_expiry_is_invalid() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1").expire(300);

    tracker.record_send("123456").await.unwrap();
    clock.advance(299);
    assert!(tracker.verify("123456").await.is_ok());

    clock.advance(1);
    assert_eq!(
        tracker.verify("123456").await.unwrap_err(),
        SendCodeError::InvalidCode
    );
}

#[tokio::test]
async fn test_consume_code() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    // Nothing stored: still reported as consumed
    assert!(tracker.consume_code().await.unwrap());

    tracker.record_send("123456").await.unwrap();
    assert!(tracker.consume_code().await.unwrap());
    assert!(!cache.contains(&tracker.code_key()));
    assert_eq!(
        tracker.verify("123456").await.unwrap_err(),
        SendCodeError::InvalidCode
    );

    // Consuming never touches the send count
    assert_eq!(tracker.attempt_record().await.unwrap().count, 1);
}

#[tokio::test]
async fn test_consume_keeps_record_without_code() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    let placeholder = std::collections::HashMap::from([
        ("code".to_string(), String::new()),
        ("time".to_string(), "0".to_string()),
    ]);
    cache.set(&tracker.code_key(), &placeholder).await.unwrap();

    assert!(tracker.consume_code().await.unwrap());
    assert!(cache.contains(&tracker.code_key()));
}

#[tokio::test]
async fn test_verify_and_consume() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    tracker.record_send("123456").await.unwrap();

    assert_eq!(
        tracker.verify_and_consume("654321").await.unwrap_err(),
        SendCodeError::CodeNotCorrect
    );
    assert!(cache.contains(&tracker.code_key()));

    tracker.verify_and_consume("123456").await.unwrap();
    assert!(!cache.contains(&tracker.code_key()));
    assert_eq!(
        tracker.verify_and_consume("123456").await.unwrap_err(),
        SendCodeError::InvalidCode
    );
}

#[tokio::test]
async fn test_types_are_tracked_separately() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::new("sms", clock.clone()));
    let login = tracker(&cache, &clock, "u1").kind(Some("login"));
    let reset = tracker(&cache, &clock, "u1").kind(Some("reset"));

    login.record_send("111111").await.unwrap();

    assert!(reset.check_send_allowed().await.is_ok());
    assert_eq!(reset.verify("111111").await.unwrap_err(), SendCodeError::InvalidCode);
    assert!(login.check_send_allowed().await.is_err());
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let clock = ManualClock::new();
    let cache = Arc::new(MockSendCache::failing("sms", clock.clone()));
    let tracker = tracker(&cache, &clock, "u1");

    let err = tracker.check_send_allowed().await.unwrap_err();
    assert_eq!(err.code(), 500);
}
