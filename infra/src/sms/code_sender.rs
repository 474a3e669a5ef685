//! SMS delivery channel adapter
//!
//! Implements the core `CodeSender` trait on top of any [`SmsService`],
//! bridging the infrastructure SMS providers with the dispatch service.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

use sc_core::services::{CodeMessage, CodeSender};
use sc_shared::recipient::mask_recipient;

use super::sms_service::{SmsService, DEFAULT_EXPIRE_MINUTES};

/// `CodeSender` that delivers codes as SMS messages
pub struct SmsCodeSender<S: SmsService + ?Sized> {
    inner: Arc<S>,
    expire_minutes: u64,
}

impl<S: SmsService + ?Sized> SmsCodeSender<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            expire_minutes: DEFAULT_EXPIRE_MINUTES,
        }
    }

    /// Quote a validity of `seconds` (rounded up to minutes) in messages
    pub fn with_expire_seconds(mut self, seconds: u64) -> Self {
        self.expire_minutes = seconds.div_ceil(60).max(1);
        self
    }

    pub fn expire_minutes(&self) -> u64 {
        self.expire_minutes
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }
}

#[async_trait]
impl<S: SmsService + ?Sized> CodeSender for SmsCodeSender<S> {
    async fn send_code(&self, message: &CodeMessage<'_>) -> bool {
        match self
            .inner
            .send_verification_code(message.to, message.code, self.expire_minutes)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(
                    to = %mask_recipient(message.to),
                    provider = self.inner.provider_name(),
                    error = %e,
                    "SMS delivery failed"
                );
                false
            }
        }
    }
}
