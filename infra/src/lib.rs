//! # Infrastructure Layer
//!
//! Concrete implementations of the ports defined in `sc_core`:
//! - **Cache**: Redis-backed and in-memory send stores (`SendCacheStore`)
//! - **SMS**: SMS delivery and the `CodeSender` adapter over it

use sc_core::errors::CacheError;

/// Cache module - Redis client and send stores
pub mod cache;

/// SMS service module - SMS delivery for verification codes
pub mod sms;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration management for infrastructure services
    //!
    //! Handles:
    //! - Redis configuration
    //! - Send code timings
    //! - SMS provider selection

    use serde::{Deserialize, Serialize};

    pub use sc_shared::config::{CacheConfig, SendCodeConfig};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// Redis cache configuration
        pub cache: CacheConfig,
        /// Send interval, code validity and lock settings
        pub send_code: SendCodeConfig,
        /// SMS service configuration
        pub sms: SmsConfig,
    }

    /// SMS service configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SmsConfig {
        /// SMS service provider ("mock")
        pub provider: String,
    }

    impl Default for SmsConfig {
        fn default() -> Self {
            Self {
                provider: "mock".to_string(),
            }
        }
    }

    impl SmsConfig {
        /// Create from environment variables
        pub fn from_env() -> Self {
            let provider = std::env::var("SMS_PROVIDER")
                .ok()
                .filter(|provider| !provider.is_empty())
                .unwrap_or_else(|| "mock".to_string());

            Self { provider }
        }
    }
}

/// Load infrastructure configuration from the environment
///
/// A `.env` file in the working directory is loaded first when present.
pub fn load_config() -> Result<config::InfrastructureConfig, InfrastructureError> {
    dotenvy::dotenv().ok();

    let config = config::InfrastructureConfig {
        cache: config::CacheConfig::from_env(),
        send_code: config::SendCodeConfig::from_env(),
        sms: config::SmsConfig::from_env(),
    };

    if config.send_code.lock_seconds == 0 {
        return Err(InfrastructureError::Config(
            "SEND_CODE_LOCK_SECONDS must be greater than zero".to_string(),
        ));
    }

    tracing::debug!(
        channel = %config.send_code.channel,
        sms_provider = %config.sms.provider,
        "Infrastructure configuration loaded"
    );

    Ok(config)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),
}

impl From<InfrastructureError> for CacheError {
    fn from(error: InfrastructureError) -> Self {
        CacheError::Backend(error.to_string())
    }
}
