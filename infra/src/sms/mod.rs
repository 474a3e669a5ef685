//! SMS Service Module
//!
//! SMS delivery for verification codes.
//!
//! ## Features
//!
//! - **SMS Service Trait**: Common interface for all SMS providers
//! - **Mock Implementation**: Logged delivery for development
//! - **Code Sender Adapter**: Plugs any provider into the dispatch service
//! - **Phone Number Validation**: E.164 format validation

pub mod code_sender;
pub mod mock_sms;
pub mod sms_service;

// Re-export commonly used types
pub use code_sender::SmsCodeSender;
pub use mock_sms::MockSmsService;
pub use sms_service::{is_valid_phone_number, verification_message, SmsService};

#[cfg(test)]
mod tests;

use std::sync::Arc;

/// Create an SMS service based on configuration
///
/// Unknown providers fall back to the mock implementation.
pub fn create_sms_service(config: &crate::config::SmsConfig) -> Arc<dyn SmsService> {
    match config.provider.as_str() {
        "mock" => Arc::new(MockSmsService::new()),
        _ => {
            tracing::warn!(
                "Unknown SMS provider '{}', using mock implementation",
                config.provider
            );
            Arc::new(MockSmsService::new())
        }
    }
}
