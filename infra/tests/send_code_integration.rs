//! End-to-end dispatch over the in-memory store and mock SMS provider

use std::sync::Arc;

use sc_core::errors::SendCodeError;
use sc_core::services::{SendCodeRequest, SendCodeService};
use sc_infra::cache::{create_send_cache, CacheConfig, MEMORY_URL};
use sc_infra::config::SmsConfig;
use sc_infra::sms::{create_sms_service, SmsCodeSender};
use sc_shared::SendCodeConfig;

#[tokio::test]
async fn test_send_then_verify_with_factories() {
    let config = SendCodeConfig::default().with_expire(600);
    let store = create_send_cache(&CacheConfig::new(MEMORY_URL), &config.channel)
        .await
        .unwrap();
    let sender = Arc::new(
        SmsCodeSender::new(create_sms_service(&SmsConfig::default()))
            .with_expire_seconds(config.code_expire_seconds),
    );
    let service = SendCodeService::new(store.clone(), sender.clone(), config);

    assert_eq!(store.name(), "sms");
    assert_eq!(sender.expire_minutes(), 10);

    let login = SendCodeRequest::new()
        .to("+8613812345678")
        .code("482913")
        .kind("login");
    assert_eq!(service.send(&login, false).await.unwrap(), 60);

    let err = service.send(&login, false).await.unwrap_err();
    assert_eq!(err.code(), 403);

    let tracker = service.tracker("+8613812345678", Some("login"));
    assert_eq!(
        tracker.verify_and_consume("000000").await.unwrap_err(),
        SendCodeError::CodeNotCorrect
    );
    tracker.verify_and_consume("482913").await.unwrap();
    assert_eq!(
        tracker.verify("482913").await.unwrap_err(),
        SendCodeError::InvalidCode
    );
}

#[tokio::test]
async fn test_invalid_number_is_send_failure() {
    let config = SendCodeConfig::default();
    let store = create_send_cache(&CacheConfig::new(MEMORY_URL), &config.channel)
        .await
        .unwrap();
    let sender = Arc::new(SmsCodeSender::new(create_sms_service(&SmsConfig::default())));
    let service = SendCodeService::new(store, sender, config);

    let request = SendCodeRequest::new().to("not-a-number").code("482913");
    assert_eq!(
        service.send(&request, false).await.unwrap_err(),
        SendCodeError::SendFailure
    );

    // Debug mode skips the provider entirely
    assert_eq!(service.send(&request, true).await.unwrap(), 60);
}
