//! SMS Service Interface
//!
//! Defines the trait for SMS service implementations that deliver
//! verification codes and other text messages.

use async_trait::async_trait;

use crate::InfrastructureError;

/// Default validity, in minutes, quoted in verification messages
pub const DEFAULT_EXPIRE_MINUTES: u64 = 30;

/// SMS service trait for sending text messages
#[async_trait]
pub trait SmsService: Send + Sync {
    /// Send an SMS message to a phone number
    ///
    /// # Arguments
    ///
    /// * `phone_number` - The recipient's phone number (E.164 format)
    /// * `message` - The message content to send
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Unique identifier for the sent message
    /// * `Err(InfrastructureError)` - If sending fails
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<String, InfrastructureError>;

    /// Send a verification code via SMS
    ///
    /// Formats the standard verification message, quoting how long the code
    /// stays valid.
    async fn send_verification_code(
        &self,
        phone_number: &str,
        code: &str,
        expire_minutes: u64,
    ) -> Result<String, InfrastructureError> {
        let message = verification_message(code, expire_minutes);
        self.send_sms(phone_number, &message).await
    }

    /// Get the service provider name
    fn provider_name(&self) -> &str;

    /// Check if the service is available
    ///
    /// Default implementation always returns true.
    async fn is_available(&self) -> bool {
        true
    }
}

/// Standard verification code message body
pub fn verification_message(code: &str, expire_minutes: u64) -> String {
    format!(
        "Your verification code is: {}. This code will expire in {} minutes.",
        code, expire_minutes
    )
}

/// Validate phone number format (E.164)
///
/// Checks if the phone number is in valid E.164 format:
/// - Starts with '+'
/// - Contains only digits after '+'
/// - Length between 10 and 15 digits (excluding '+')
pub fn is_valid_phone_number(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };

    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
