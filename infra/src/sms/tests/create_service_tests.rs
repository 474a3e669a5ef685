//! Unit tests for SMS service creation

use crate::config::SmsConfig;
use crate::sms::create_sms_service;

#[test]
fn test_create_mock_service() {
    let service = create_sms_service(&SmsConfig::default());
    assert_eq!(service.provider_name(), "Mock");
}

#[test]
fn test_create_unknown_provider_fallback() {
    let config = SmsConfig {
        provider: "unknown".to_string(),
    };

    let service = create_sms_service(&config);
    // Should fallback to mock
    assert_eq!(service.provider_name(), "Mock");
}
